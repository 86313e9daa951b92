//! Transport Reader
//!
//! Plain TCP connections that send request text and receive replies with an
//! idle-timeout policy: a receive keeps polling the bytes waiting on the
//! socket and returns once the count stops changing for a while, the
//! receive buffer is full, or the peer has closed the stream.

mod connection;

pub use connection::{connect, Connection};

use thiserror::Error;

/// Errors raised by connection establishment, writes and reads
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to {peer}: {source}")]
    Connect {
        peer: String,
        source: std::io::Error,
    },

    #[error("Connection to {peer} timed out")]
    ConnectTimeout { peer: String },

    #[error("Failed to send to {peer}: {source}")]
    Send {
        peer: String,
        source: std::io::Error,
    },

    #[error("Failed to receive from {peer}: {source}")]
    Receive {
        peer: String,
        source: std::io::Error,
    },
}
