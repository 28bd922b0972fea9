use thiserror::Error;

/// Fatal reader-driver failures.
///
/// Everything here means the link to the chip itself is broken; no amount
/// of re-reading will produce a tag. Per-attempt protocol failures never
/// surface through this type — they collapse to "no tag" at the
/// [`Mfrc522::attempt_read`](crate::Mfrc522::attempt_read) boundary.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The SPI bus could not be opened.
    #[error("SPI bus unavailable: {0}")]
    BusUnavailable(#[from] rppal::spi::Error),

    /// The reset line could not be claimed.
    #[error("GPIO unavailable: {0}")]
    GpioUnavailable(#[from] rppal::gpio::Error),

    /// The configured bus or slave-select selector does not exist.
    #[error("Invalid bus configuration: {0}")]
    InvalidBusConfig(String),

    /// A register transaction failed mid-transfer.
    #[error("Register transfer failed: {0}")]
    Transfer(String),

    /// Post-reset register reads never stabilized within the bounded
    /// retry budget.
    #[error("Reader did not stabilize after reset")]
    InitTimeout,
}
