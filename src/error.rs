use thiserror::Error;

/// Failures of the point-to-point channels themselves.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{node} has no link to {peer}")]
    UnknownPeer { node: String, peer: String },
    #[error("{peer} hung up on {node}")]
    Disconnected { node: String, peer: String },
}

/// Errors that abort a role. None of them is retried.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{node} expected {expected} from {from}, got {got}")]
    UnexpectedMessage {
        node: String,
        from: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("{node} got a {report} of length {actual} from {from}, expected {expected}")]
    ReportLength {
        node: String,
        from: String,
        report: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{node} got {actual} positions from {from}, capacity is {capacity}")]
    ReportOverflow {
        node: String,
        from: String,
        capacity: usize,
        actual: usize,
    },
    #[error("failed to spawn {node}: {source}")]
    Spawn {
        node: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{node} panicked")]
    Panicked { node: String },
}

impl SimError {
    /// True for failures caused by a peer going away rather than by this role.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            SimError::Transport(TransportError::Disconnected { .. })
        )
    }
}
