//! Procedural macros for qparam
//!
//! This crate provides `#[derive(QueryRecord)]`, which generates the field
//! descriptors the decoder uses in place of runtime reflection. Depend on
//! `qparam-core` instead of this crate; it re-exports the derive.

use proc_macro::TokenStream;

mod attrs;
mod query_record;
mod types;

/// Derive macro for the QueryRecord trait
///
/// Each public field annotated with `#[qp("key")]` is decoded from the
/// values of `key`. Unannotated public fields whose type is another record
/// (or an `Option` of one) are decoded from the same values. Everything
/// else is left alone.
///
/// # Example
///
/// ```rust,ignore
/// use qparam_core::QueryRecord;
///
/// #[derive(QueryRecord, Default)]
/// struct Search {
///     #[qp("q")]
///     pub query: String,
///     #[qp("tags")]
///     pub tags: Vec<String>,
///     #[qp("-")]
///     pub cached: bool,
///     pub pagination: Option<Pagination>,
/// }
/// ```
#[proc_macro_derive(QueryRecord, attributes(qp))]
pub fn derive_query_record(input: TokenStream) -> TokenStream {
    query_record::derive_query_record(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
