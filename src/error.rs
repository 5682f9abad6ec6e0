//! Central error handling for the envlight pipeline
//!
//! Provides a unified EnvError enum with consistent categorization:
//! format decode failures, capability gaps, GPU resource failures and
//! network failures each map to their own variant.

use std::error::Error as StdError;

type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Centralized error type for all precompute operations
#[derive(thiserror::Error, Debug)]
pub enum EnvError {
    /// Malformed HDR data: bad magic, bad header, bad RLE stream,
    /// oversized dimensions, truncated buffer. Always fatal.
    #[error("invalid HDR data: {msg}")]
    Format {
        msg: String,
        /// Byte offset of the offending data, when known.
        offset: Option<usize>,
    },

    /// A requested format or feature the device cannot provide. Raised
    /// before any GPU allocation, never silently downgraded.
    #[error("unsupported capability: {0}")]
    Capability(String),

    /// Allocation or pipeline failure after validation passed. Partially
    /// created GPU resources are destroyed before this propagates.
    #[error("GPU resource failure: {msg}")]
    Resource {
        msg: String,
        #[source]
        source: Option<Cause>,
    },

    /// Fetch failure or non-2xx response.
    #[error("network error: {msg}")]
    Network {
        msg: String,
        status: Option<u16>,
        #[source]
        source: Option<Cause>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvError {
    /// Format-level decode failure with no position information
    pub fn format<T: ToString>(msg: T) -> Self {
        EnvError::Format {
            msg: msg.to_string(),
            offset: None,
        }
    }

    /// Format-level decode failure at a known byte offset
    pub fn format_at<T: ToString>(offset: usize, msg: T) -> Self {
        EnvError::Format {
            msg: format!("{} (at byte {offset})", msg.to_string()),
            offset: Some(offset),
        }
    }

    pub fn capability<T: ToString>(msg: T) -> Self {
        EnvError::Capability(msg.to_string())
    }

    pub fn resource<T: ToString>(msg: T) -> Self {
        EnvError::Resource {
            msg: msg.to_string(),
            source: None,
        }
    }

    /// Resource failure wrapping the stage-level cause
    pub fn resource_with<T: ToString>(msg: T, source: EnvError) -> Self {
        EnvError::Resource {
            msg: msg.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn network<T: ToString>(msg: T, status: Option<u16>) -> Self {
        let msg = match status {
            Some(code) => format!("{} (HTTP {code})", msg.to_string()),
            None => msg.to_string(),
        };
        EnvError::Network {
            msg,
            status,
            source: None,
        }
    }

    pub fn network_with<T: ToString>(msg: T, source: Cause) -> Self {
        EnvError::Network {
            msg: msg.to_string(),
            status: None,
            source: Some(source),
        }
    }
}

pub type EnvResult<T> = Result<T, EnvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_at_carries_offset_in_message_and_field() {
        let err = EnvError::format_at(42, "unexpected end of RLE stream");
        match &err {
            EnvError::Format { offset, .. } => assert_eq!(*offset, Some(42)),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert!(err.to_string().contains("at byte 42"));
    }

    #[test]
    fn resource_with_chains_cause() {
        let cause = EnvError::capability("float32 filtering not available");
        let err = EnvError::resource_with("specular prefilter failed", cause);
        let source = std::error::Error::source(&err).expect("cause retained");
        assert!(source.to_string().contains("float32"));
    }

    #[test]
    fn network_embeds_status() {
        let err = EnvError::network("fetching environment", Some(404));
        assert!(err.to_string().contains("HTTP 404"));
    }
}
