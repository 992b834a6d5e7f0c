use thiserror::Error;

/// Failures while obtaining a bundle. These never escape `source::load_bundle`;
/// they are logged and replaced by the mock bundle.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("bundle request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend responded with status {0}")]
    Status(u16),

    #[error("bundle payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("bundle file could not be read: {0}")]
    Io(#[from] std::io::Error),
}
