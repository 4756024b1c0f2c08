use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("LED index out of range: {value} (strip has {limit} LEDs)")]
    LedIndexOutOfRange { value: u16, limit: u8 },

    #[error("Color component '{channel}' out of range: {value}")]
    ColorOutOfRange { channel: char, value: u16 },

    #[error("Invalid barcode: {0}")]
    InvalidBarcode(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
