use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid address type: {0}")]
    InvalidAddressType(String),

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
