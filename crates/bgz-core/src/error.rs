//! Error types for bgz

use thiserror::Error;

/// A rejected option value. Reported synchronously when an effect is
/// configured, before any element lookup or scheduling happens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Option `{field}` must be a finite number, got {value}")]
    NotFinite { field: String, value: f64 },

    #[error("Option `{field}` range is empty: min ({min}) must be less than max ({max})")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("Option `{field}`: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Option `{field}`: expected {expected}, got {got}")]
    InvalidFieldType {
        field: String,
        expected: String,
        got: String,
    },

    #[error("Option `{field}` must not be negative, got {value}")]
    Negative { field: String, value: f64 },

    #[error("Option `{field}` must be greater than zero, got {value}")]
    NotPositive { field: String, value: f64 },

    #[error("Option `{field}` must be at least {min}, got {value}")]
    BelowMinimum { field: String, value: f64, min: f64 },

    #[error("Option `{field}` must lie within [{min}, {max}], got {value}")]
    OutOfBounds {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Option `{field}`: cannot parse color {value:?}")]
    InvalidColor { field: String, value: String },

    #[error("Option `{field}` must not be empty")]
    Empty { field: String },
}

/// The main error type for bgz operations
#[derive(Debug, Error)]
pub enum BgzError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    #[error("No element matches selector {0:?}")]
    TargetNotFound(String),

    #[error("Element {selector:?} must be a <{expected}> element, found <{found}>")]
    WrongElementKind {
        selector: String,
        expected: String,
        found: String,
    },

    #[error("Effect loop {0} is already running")]
    AlreadyRunning(u64),

    #[error("Surface for effect loop {0} has been released")]
    SurfaceReleased(u64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Surface error: {0}")]
    SurfaceError(String),
}

impl BgzError {
    /// True for option validation failures
    pub fn is_config_error(&self) -> bool {
        matches!(self, BgzError::Config(_))
    }
}

/// Result type alias for bgz operations
pub type Result<T> = std::result::Result<T, BgzError>;

impl From<toml::de::Error> for BgzError {
    fn from(err: toml::de::Error) -> Self {
        BgzError::TomlParseError(err.to_string())
    }
}
