use std::time::Duration;
use thiserror::Error;

/// Why the reply service could not produce an answer.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("no LLM provider configured")]
    Unconfigured,

    #[error("{provider} did not answer within {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("{provider} request failed: {source:#}")]
    Provider {
        provider: String,
        #[source]
        source: anyhow::Error,
    },
}
