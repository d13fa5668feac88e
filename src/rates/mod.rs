//! Exchange rate sources and the fallback chain over them.

pub mod chain;
pub mod logging;
pub mod providers;

use async_trait::async_trait;

use crate::context::{Context, ContextError};
use crate::domain::CurrencyPair;
use crate::rpc::RpcError;

pub use chain::RateSourceChain;
pub use logging::WithLogging;

/// Anything that can quote the configured currency pair.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError>;
}

#[derive(thiserror::Error, Debug)]
pub enum RateError {
    #[error("{provider}: failed to query the rate API")]
    Request {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider}: exchange rate for {pair} pair is not found")]
    PairNotFound {
        provider: &'static str,
        pair: CurrencyPair,
    },
    #[error("failed to get the rate from the rate watcher")]
    Rpc(#[from] RpcError),
    #[error("all {attempted} rate sources failed")]
    SourcesExhausted {
        attempted: usize,
        #[source]
        last: Box<RateError>,
    },
    #[error("rate lookup was interrupted")]
    Cancelled(#[from] ContextError),
}

impl RateError {
    /// The context failure behind this error, looking through an exhausted chain
    /// whose last source was interrupted.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            RateError::Cancelled(ctx_err) => Some(*ctx_err),
            RateError::SourcesExhausted { last, .. } => last.context_error(),
            _ => None,
        }
    }
}
