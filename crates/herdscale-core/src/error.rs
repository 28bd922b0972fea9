use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Tag acquisition errors
    #[error("Invalid anti-collision frame: expected {expected} bytes, got {actual}")]
    InvalidTagFrame { expected: usize, actual: usize },

    #[error("Tag checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Invalid tag identifier: {0}")]
    InvalidTagFormat(String),

    // Identification errors
    #[error("Invalid device ID: {0}")]
    InvalidDeviceId(String),

    #[error("Invalid camera position: {0}")]
    InvalidCameraPosition(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
