pub mod logs;
pub mod object;

pub use logs::*;
pub use object::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage not configured: {0}")]
    NotConfigured(&'static str),

    #[error("storage endpoint unreachable at {0}")]
    Connection(String),

    #[error("storage returned error (status {status}): {body}")]
    Backend { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("invalid image payload: {0}")]
    InvalidPayload(String),
}
