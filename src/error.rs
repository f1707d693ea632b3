use std::fmt::Display;

use alloy::{sol_types, transports};

/// Error raised while tracking a chain.
///
/// All variants are chain-local and transient: the poll loop keeps running
/// and retries on its next tick.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RadarError {
    #[error("height check failed: {0}")]
    HeightCheckFailed(String),

    #[error("log query failed: {0}")]
    QueryFailed(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected empty RPC response")]
    NullResp,
}

impl RadarError {
    /// Wraps the error as a failed height check, keeping its message.
    pub fn into_height_check(self) -> Self {
        match self {
            Self::HeightCheckFailed(_) => self,
            other => Self::HeightCheckFailed(other.to_string()),
        }
    }

    /// Wraps the error as a failed log query, keeping its message.
    pub fn into_query(self) -> Self {
        match self {
            Self::QueryFailed(_) => self,
            other => Self::QueryFailed(other.to_string()),
        }
    }

    pub fn is_height_check(&self) -> bool {
        matches!(self, Self::HeightCheckFailed(_))
    }
}

impl<E: Display> From<transports::RpcError<E>> for RadarError {
    fn from(value: transports::RpcError<E>) -> Self {
        match value {
            transports::RpcError::ErrorResp(ref resp) => {
                let msg = resp.message.to_ascii_lowercase();
                // Range and result-size limits of eth_getLogs surface as -32005
                // or -32602 depending on the provider
                if (resp.code == -32600 || resp.code == -32602 || resp.code == -32005)
                    && (msg.contains("invalid")
                        || msg.contains("range")
                        || msg.contains("limit")
                        || msg.contains("not found"))
                {
                    Self::InvalidRequest(msg)
                } else {
                    Self::Transport(value.to_string())
                }
            }
            transports::RpcError::NullResp => Self::NullResp,
            _ => Self::Transport(value.to_string()),
        }
    }
}

impl From<sol_types::Error> for RadarError {
    fn from(value: sol_types::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
