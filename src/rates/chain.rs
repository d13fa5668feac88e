use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::rates::{RateError, RateSource};

/// Ordered list of rate sources, tried in priority order until one answers.
///
/// All sources share the caller's context. Once it is cancelled or past its
/// deadline the chain stops and reports [`RateError::Cancelled`] instead of
/// burning through the remaining sources.
pub struct RateSourceChain {
    primary: Arc<dyn RateSource>,
    fallbacks: Vec<Arc<dyn RateSource>>,
}

impl RateSourceChain {
    pub fn new(primary: Arc<dyn RateSource>) -> RateSourceChain {
        RateSourceChain {
            primary,
            fallbacks: Vec::new(),
        }
    }

    /// Appends `source` at the lowest priority.
    pub fn with_source(mut self, source: Arc<dyn RateSource>) -> RateSourceChain {
        self.fallbacks.push(source);
        self
    }

    pub fn len(&self) -> usize {
        1 + self.fallbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[async_trait]
impl RateSource for RateSourceChain {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        let mut last = match ctx.run(self.primary.convert(ctx)).await? {
            Ok(rate) => return Ok(rate),
            Err(err) => err,
        };

        for (position, source) in self.fallbacks.iter().enumerate() {
            tracing::warn!(
                error = %last,
                next_source = position + 2,
                "Rate source failed, falling back to the next one"
            );

            match ctx.run(source.convert(ctx)).await? {
                Ok(rate) => return Ok(rate),
                Err(err) => last = err,
            }
        }

        Err(RateError::SourcesExhausted {
            attempted: self.len(),
            last: Box::new(last),
        })
    }
}
