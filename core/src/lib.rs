//! Small blocking HTTP client on top of libcurl.
//!
//! # Overview
//! A `TransportContext` owns process-wide library initialization. A
//! `Request` borrows it, is configured through chained setters, and performs
//! one exchange per verb call, returning a `Response` by value.
//!
//! # Design
//! - Protocol work (redirects, chunked decoding, TLS, timeouts) is left to
//!   libcurl; this crate manages handle lifetime and collects what the
//!   engine delivers.
//! - `Request` is move-only and reusable. Response state is rebuilt on every
//!   call, configuration persists.
//! - Failures are either `Error::Init` or `Error::Transfer`; nothing is
//!   retried.

pub mod client;
pub mod context;
pub mod error;
pub mod http;

pub use client::Request;
pub use context::{GlobalFlags, TransportContext};
pub use error::{Error, TransferError};
pub use http::{Method, RequestOptions, Response, DEFAULT_TIMEOUT_MS, DEFAULT_USER_AGENT};
