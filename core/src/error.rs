//! Error types for mask lookups, the raw HTTP transport and the verification
//! client.
//!
//! # Design
//! Each concern gets its own enum so callers can tell "the mask is broken"
//! from "the backend is unreachable" from "the backend answered something
//! unexpected". A point outside the mask is not an error at all: it is the
//! `Lookup::OutOfRange` outcome and classifies as `false`.

use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while opening, reading or decoding a solution mask.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Seek or read failure on the mask storage.
    #[error("mask io: {0}")]
    Io(#[from] io::Error),

    /// No mask file exists for this id.
    #[error("unknown mask: {0}")]
    UnknownMask(String),

    /// The id contains characters that cannot name a mask file.
    #[error("invalid mask id: {0:?}")]
    InvalidId(String),

    /// The first line is not `<id> <dir> <h>x<w> <colbytes> <hlen>`.
    #[error("malformed mask header: {0}")]
    MalformedHeader(String),

    /// A row could not be decoded under the strict row policy.
    #[error("malformed row {row} at byte {offset}: {fault}")]
    MalformedRow {
        row: u32,
        offset: usize,
        fault: RowFault,
    },
}

/// Why a row token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFault {
    /// A non-zero run length with no color code after it.
    DanglingLength,
    /// A color code with no run length before it, or any other stray byte.
    UnexpectedByte(u8),
    /// The run length does not fit in 32 bits.
    LengthOverflow,
    /// The row holds no run at all.
    Empty,
}

impl fmt::Display for RowFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowFault::DanglingLength => write!(f, "run length without color code"),
            RowFault::UnexpectedByte(b) => write!(f, "unexpected byte 0x{b:02x}"),
            RowFault::LengthOverflow => write!(f, "run length overflows u32"),
            RowFault::Empty => write!(f, "row holds no runs"),
        }
    }
}

/// Socket stage during which a timeout fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connect,
    Write,
    Read,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Connect => write!(f, "connect"),
            Phase::Write => write!(f, "write"),
            Phase::Read => write!(f, "read"),
        }
    }
}

/// Errors returned by `RawHttpClient::send`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The host name did not resolve to any socket address.
    #[error("could not resolve {addr}: {source}")]
    Resolve { addr: String, source: io::Error },

    /// Every resolved address refused or failed the connection.
    #[error("could not open socket to {addr}: {source}")]
    Connect { addr: String, source: io::Error },

    /// Connect or socket I/O exceeded its configured timeout.
    #[error("{phase} timed out after {after:?}")]
    Timeout { phase: Phase, after: Duration },

    /// Any other socket failure after the connection was established.
    #[error("transport io: {0}")]
    Io(#[from] io::Error),
}

/// Errors returned by `VerifyClient::parse_check`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend returned 404: it has no mask under that id.
    #[error("solution not found")]
    NotFound,

    /// The backend returned a status other than 200 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The header block has no parseable status line.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A 200 response whose body is neither `OK` nor `KO`.
    #[error("unexpected verdict body: {0:?}")]
    UnexpectedBody(String),
}

/// Either half of a `VerifyClient::check` round-trip failing.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors raised while loading a `Config`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io: {0}")]
    Io(#[from] io::Error),

    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
}
