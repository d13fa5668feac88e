use async_trait::async_trait;

use crate::context::Context;
use crate::rates::{RateError, RateSource};

/// Logs every conversion attempt of the wrapped source and hands back its
/// result untouched. Works around a single provider or a whole chain.
pub struct WithLogging<S> {
    inner: S,
    source: String,
}

impl<S: RateSource> WithLogging<S> {
    pub fn new(inner: S, source: impl Into<String>) -> WithLogging<S> {
        WithLogging {
            inner,
            source: source.into(),
        }
    }
}

#[async_trait]
impl<S: RateSource> RateSource for WithLogging<S> {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        tracing::info!(source = %self.source, "Sending request to the rate source");

        let result = self.inner.convert(ctx).await;

        match &result {
            Ok(rate) => tracing::info!(source = %self.source, rate, "Received rate"),
            Err(err) => tracing::error!(source = %self.source, error = ?err, "Rate source failed"),
        }

        result
    }
}
