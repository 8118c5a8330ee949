use std::fmt;

/// Custom error types for the persona engine
#[derive(Debug, Clone)]
pub enum PersonaEngineError {
    /// Invalid or unparseable chess position (bad FEN)
    InvalidPosition(String),
    /// Move token that does not parse or is not legal in the given position
    InvalidMove(String),
    /// Saving or restoring learned state failed
    PersistenceError(String),
    /// File I/O operation failed
    IoError(String),
    /// Character lifecycle operation failed (duplicate name, unknown name, ...)
    CharacterError(String),
    /// Malformed request at the transport boundary
    ProtocolError(String),
}

impl fmt::Display for PersonaEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonaEngineError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            PersonaEngineError::InvalidMove(msg) => write!(f, "Invalid move: {}", msg),
            PersonaEngineError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
            PersonaEngineError::IoError(msg) => write!(f, "I/O error: {}", msg),
            PersonaEngineError::CharacterError(msg) => write!(f, "Character error: {}", msg),
            PersonaEngineError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
        }
    }
}

impl std::error::Error for PersonaEngineError {}

// Convenience type alias
pub type Result<T> = std::result::Result<T, PersonaEngineError>;

// Convert from common error types
impl From<std::io::Error> for PersonaEngineError {
    fn from(error: std::io::Error) -> Self {
        PersonaEngineError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for PersonaEngineError {
    fn from(error: serde_json::Error) -> Self {
        PersonaEngineError::PersistenceError(format!("JSON serialization error: {}", error))
    }
}

impl From<bincode::Error> for PersonaEngineError {
    fn from(error: bincode::Error) -> Self {
        PersonaEngineError::PersistenceError(format!("Binary serialization error: {}", error))
    }
}

// Helper macros for error creation
#[macro_export]
macro_rules! invalid_position {
    ($msg:expr) => {
        $crate::errors::PersonaEngineError::InvalidPosition($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::PersonaEngineError::InvalidPosition(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! invalid_move {
    ($msg:expr) => {
        $crate::errors::PersonaEngineError::InvalidMove($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::PersonaEngineError::InvalidMove(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! character_error {
    ($msg:expr) => {
        $crate::errors::PersonaEngineError::CharacterError($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::PersonaEngineError::CharacterError(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! protocol_error {
    ($msg:expr) => {
        $crate::errors::PersonaEngineError::ProtocolError($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::PersonaEngineError::ProtocolError(format!($fmt, $($arg)*))
    };
}
