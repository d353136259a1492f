use thiserror::Error;

/// The core never fails on data; only configuration can be rejected.
#[derive(Debug, Error)]
pub enum GridError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// A field is outside its allowed range.
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}
