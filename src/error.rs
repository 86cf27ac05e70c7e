//! Error types for protocol probes

use std::io;
use thiserror::Error;

/// Why a single protocol probe could not complete.
///
/// These never leave the probe layer: [`crate::proxy::Prober`] collapses every
/// variant into a plain failed check.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("timed out")]
    Timeout,

    #[error("could not resolve {0} to an IPv4 address")]
    Resolve(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("blocking probe task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
