//! Solution-mask verification and a raw HTTP client for the remote
//! verification backend.
//!
//! # Overview
//! A solution mask is a text file holding one run-length-encoded row per
//! pixel row of a challenge image. Rows share a fixed byte width, so any row
//! can be read with a single seek. `MaskFile::classify` answers "is this
//! point inside the target region?" by reading and decoding just that row.
//!
//! The second half talks to a verification backend over a plain TCP socket:
//! `HttpRequest` serializes a hand-built GET or POST, `RawHttpClient` writes
//! it and reads the response until the peer closes.
//!
//! # Design
//! - Both flows are synchronous and blocking; nothing is shared between calls.
//! - `VerifyClient` follows a build/parse split so request construction and
//!   response interpretation stay free of I/O.
//! - Failures are returned, never turned into process exits.

pub mod classify;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod header;
pub mod http;
pub mod locator;
pub mod rle;
pub mod store;
pub mod transport;
pub mod types;

pub use classify::{Lookup, MaskFile};
pub use client::VerifyClient;
pub use config::{Config, MaskConfig, RemoteConfig, DEFAULT_PORT};
pub use error::{ApiError, ConfigError, MaskError, Phase, RowFault, TransportError, VerifyError};
pub use header::MaskHeader;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use rle::{Run, RowPolicy, RunDecoder};
pub use store::MaskStore;
pub use transport::RawHttpClient;
pub use types::{Point, PointError};
