/// Core error type.
///
/// Adapter crates map their library errors into this type so the dispatcher
/// can handle failures consistently (skip a branch vs abandon the update).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("user store error: {0}")]
    Store(String),

    #[error("file resolution failed: {0}")]
    FileResolve(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed update: {0}")]
    MalformedUpdate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
