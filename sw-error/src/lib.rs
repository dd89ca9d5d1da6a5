//! Unified error handling for switchinfo
//!
//! This crate provides the single error type used by the core library and the
//! binary. Every variant maps to a process exit status so the CLI can report
//! configuration, dependency and device problems distinctly from hardware
//! query failures.

use std::io;

/// Result type alias using SwitchInfoError
pub type Result<T> = std::result::Result<T, SwitchInfoError>;

/// Unified error type for all switchinfo operations
#[derive(thiserror::Error, Debug)]
pub enum SwitchInfoError {
    // ============================================================================
    // Detected before any hardware query
    // ============================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dependency error: {0}")]
    Dependency(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // ============================================================================
    // Register access
    // ============================================================================
    #[error("Failed to query register {register}: {message}")]
    RegisterFetch {
        register: String,
        message: String,
    },

    #[error("Register query timed out: {0}")]
    Timeout(String),

    // ============================================================================
    // Decoding
    // ============================================================================
    #[error("Malformed hex value '{value}'")]
    MalformedHex {
        value: String,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    // ============================================================================
    // Plumbing
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("{0}")]
    Generic(String),
}

impl SwitchInfoError {
    /// Create a configuration error from a string
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a dependency error from a string
    pub fn dependency(msg: impl Into<String>) -> Self {
        Self::Dependency(msg.into())
    }

    /// Create a device error from a string
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// Create a decode error from a string
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a malformed hex error for the offending raw value
    pub fn malformed_hex(value: impl Into<String>) -> Self {
        Self::MalformedHex { value: value.into() }
    }

    /// Create a register fetch error
    pub fn register_fetch(register: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RegisterFetch {
            register: register.into(),
            message: message.into(),
        }
    }

    /// Process exit status for this error class
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::Dependency(_) => 3,
            Self::Device(_) => 4,
            Self::RegisterFetch { .. } | Self::Timeout(_) => 5,
            Self::MalformedHex { .. } | Self::Decode(_) => 6,
            Self::PermissionDenied(_) | Self::Io(_) | Self::JsonParse(_) | Self::Generic(_) => 1,
        }
    }

    /// True for errors raised before any register was queried
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Dependency(_) | Self::Device(_) | Self::PermissionDenied(_)
        )
    }
}

// Allow converting from String to SwitchInfoError
impl From<String> for SwitchInfoError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to SwitchInfoError
impl From<&str> for SwitchInfoError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
