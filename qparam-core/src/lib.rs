//! qparam - Core
//!
//! Decode URL query parameters into strongly-typed structs.
//!
//! # Overview
//!
//! Annotate a struct once with `#[derive(QueryRecord)]` and `#[qp("key")]`
//! field attributes, then decode any query string, URI or HTTP request into
//! it. Field descriptors are generated at compile time and cached per type
//! on first use, so decoding does no runtime type inspection.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use qparam_core::{decode_url, QueryRecord};
//! use chrono::{DateTime, FixedOffset};
//!
//! #[derive(QueryRecord, Default, Debug)]
//! struct Pagination {
//!     #[qp("limit")]
//!     pub limit: u32,
//!     #[qp("offset")]
//!     pub offset: u32,
//! }
//!
//! #[derive(QueryRecord, Default, Debug)]
//! struct Search {
//!     #[qp("q")]
//!     pub query: String,
//!     #[qp("tags")]
//!     pub tags: Vec<String>,
//!     #[qp("since")]
//!     pub since: Option<DateTime<FixedOffset>>,
//!     // No annotation: nested, reads `limit` and `offset` from the same query
//!     pub pagination: Pagination,
//! }
//!
//! let mut search = Search::default();
//! decode_url("/search?q=rust&tags=a,b&tags=c&limit=20", &mut search)?;
//! assert_eq!(search.tags, ["a", "b", "c"]);
//! ```
//!
//! # Architecture
//!
//! - [`schema`] - `QueryRecord`, field descriptors and the schema cache
//! - [`decode`] - the decode engine and [`Decoder`]
//! - [`coerce`] - `FromQuery` / `QueryScalar` conversions per field type
//! - [`time`] - flexible timestamp parsing
//! - [`values`] - the raw key/value multimap
//! - [`config`] - decoder configuration with TOML support

// Generated code names this crate by path, including inside its own tests
extern crate self as qparam_core;

pub mod adapter;
pub mod coerce;
pub mod config; // Configuration system with TOML support
pub mod decode;
pub mod error;
pub mod schema;
pub mod shape;
pub mod time;
pub mod values;

// Re-export the derive macro so users only need one crate
#[cfg(feature = "macros")]
pub use qparam_macros::QueryRecord;

pub use adapter::{decode_request, decode_url};
pub use coerce::{scalar_from_query, FromQuery, QueryScalar};
pub use config::DecodeConfig;
pub use decode::{decode, decode_nested, decode_optional_nested, Decoder};
pub use error::{DecodeError, DecodeResult};
pub use schema::{
    cached_schema_count, schema_for, FieldAccess, FieldDescriptor, QueryRecord, StructSchema,
};
pub use shape::{PrimitiveKind, TypeShape};
pub use time::{parse_timestamp, parse_timestamp_with};
pub use values::RawValues;
