//! OHT Client - async client for the One Hour Translation API v2
//!
//! Responses are decoded into [`DecodedNode`] trees: objects with
//! identifier-safe keys become ordered records, everything else stays a
//! lookup-by-key mapping.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;

// Re-export key types for convenience
pub use core::{
    client::OhtClient,
    config::OhtConfig,
    decoder::{decode, is_field_identifier, DecodedNode, NodeKind, Record, Scalar},
    endpoints::Endpoint,
    errors::{OhtError, Result},
    models::{
        ApiStatus, Currency, FileResource, ProjectOptions, QuoteOptions, RatingType,
        ResourceFetch, Service, TranscriptionOptions,
    },
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
