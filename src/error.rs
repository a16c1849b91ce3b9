//! Unified error types for the home-automation mesh.
//!
//! A single `Error` enum that every subsystem converts into.  All variants
//! are `Copy` so they can be passed through node handlers and the
//! simulator without allocation.
//!
//! None of these are fatal: a node that hits one logs it and keeps
//! running.  Delivery failures of reliable unicasts are deliberately
//! absent here, since they never reach the application layer.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A radio payload could not be encoded or decoded.
    Codec(CodecError),
    /// Configuration is invalid.
    Config(&'static str),
    /// A node's event queue overflowed.
    QueueFull,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::QueueFull => write!(f, "event queue full"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Payload carried no bytes at all.
    Empty,
    /// Payload is not one of the known ASCII tags.
    UnknownTag,
    /// An integer reply must be exactly four bytes.
    BadReplyLength(usize),
    /// Encoded message does not fit a radio frame.
    PayloadTooLong(usize),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::UnknownTag => write!(f, "unknown message tag"),
            Self::BadReplyLength(n) => write!(f, "integer reply of {n} bytes (expected 4)"),
            Self::PayloadTooLong(n) => write!(f, "payload of {n} bytes exceeds frame"),
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
