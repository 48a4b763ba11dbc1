use std::fmt;

/// Errors that can occur while loading a tracker configuration blob.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration buffer is empty")]
    EmptyInput,

    #[error("failed to parse JSON configuration: {0}")]
    Parse(#[from] DocumentError),

    #[error("object expected at the root of the configuration")]
    NotAnObject,

    #[error("parse error in field '{key}': {source}")]
    Field {
        key: String,
        #[source]
        source: FieldError,
    },
}

impl ConfigError {
    /// Status code returned across the C boundary for this error.
    pub fn status(&self) -> i32 {
        match self {
            ConfigError::EmptyInput => crate::loader::STATUS_EMPTY_INPUT,
            ConfigError::Parse(_) => crate::loader::STATUS_PARSE_FAILED,
            ConfigError::NotAnObject => crate::loader::STATUS_NOT_AN_OBJECT,
            ConfigError::Field { .. } => crate::loader::STATUS_FIELD_ERROR,
        }
    }
}

/// Structural failures: malformed JSON or a document over its limits.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("node limit of {limit} exceeded")]
    TooManyNodes { limit: usize },

    #[error("nesting depth limit of {limit} exceeded")]
    TooDeep { limit: usize },
}

/// Failures decoding the contents of a recognized numeric field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("element {index} is not a numeric literal")]
    NotNumeric { index: usize },

    #[error("literal of {len} bytes exceeds the {limit} byte limit")]
    LiteralTooLong { len: usize, limit: usize },

    #[error("'{literal}' is not a decimal number")]
    BadNumber { literal: String },

    /// Tolerated: the point list is skipped rather than failing the load.
    #[error("sensor {index} is not an [x, y, z] triple")]
    BadSensorTriple { index: usize },
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &dyn fmt::Display) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut msg) = self.message.lock() {
            msg.clear();
        }
    }

    /// Pointer to the current message, or null. A later `set` or `clear`
    /// from any thread frees the storage it points into.
    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}
