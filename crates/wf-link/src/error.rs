//! Link errors

use wf_core::WfError;

/// Device link errors
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Not connected to broker")]
    NotConnected,

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid link configuration: {0}")]
    InvalidConfig(String),
}

impl From<LinkError> for WfError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::InvalidConfig(msg) => WfError::Configuration(msg),
            other => WfError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let err: WfError = LinkError::NotConnected.into();
        assert!(matches!(err, WfError::Transport(_)));
        assert!(!err.is_fatal());

        let err: WfError = LinkError::InvalidConfig("port 0".into()).into();
        assert!(err.is_fatal());
    }
}
