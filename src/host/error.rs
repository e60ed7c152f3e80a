use thiserror::Error;

use crate::host::types::{TabId, WindowId};

/// Error type for host interactions.
///
/// Every call against the host is fallible: a window can vanish between
/// enumeration and use, the bridge can drop, or the peer can send something
/// we cannot decode.
#[derive(Debug, Error)]
pub enum HostError {
    /// The referenced window no longer exists on the host side.
    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    /// The referenced tab no longer exists on the host side.
    #[error("Tab {0} not found")]
    TabNotFound(TabId),

    /// The host connection has gone away.
    #[error("Host disconnected")]
    Disconnected,

    /// The host replied with something we could not interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The host reported a failure executing the call.
    #[error("Host call failed: {0}")]
    CallFailed(String),

    /// I/O failure on the host transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
