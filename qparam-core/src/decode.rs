//! Decode engine
//!
//! Walks a record's cached schema, looks up each field's key in the raw
//! values and hands the matching strings to the field's coercion. Nested
//! records share the same flat key namespace and recurse through their own
//! schema.

use crate::config::DecodeConfig;
use crate::error::{DecodeError, DecodeResult};
use crate::schema::{schema_for, FieldAccess, QueryRecord};
use crate::shape::TypeShape;
use crate::values::RawValues;

/// Decode `values` into `target` with the default configuration
///
/// Fields whose key is absent, or whose values are all empty for an
/// optional or sequence field, keep their current value. The first field
/// that fails aborts the decode; fields written before it stay written.
pub fn decode<R: QueryRecord>(values: &RawValues, target: &mut R) -> DecodeResult<()> {
    decode_record(values, target, &DecodeConfig::default())
        .map(|_| ())
        .map_err(|e| e.in_record(R::TYPE_NAME))
}

/// Optional and sequence fields treat a key with only empty values as absent
fn is_blank_for(shape: &TypeShape, raw: &[String]) -> bool {
    matches!(shape, TypeShape::Optional(_) | TypeShape::Sequence(_)) && raw.iter().all(String::is_empty)
}

/// Returns whether any field, at any depth, received a non-zero value
pub(crate) fn decode_record<R: QueryRecord>(
    values: &RawValues,
    target: &mut R,
    config: &DecodeConfig,
) -> DecodeResult<bool> {
    let schema = schema_for::<R>();
    if schema.has_hidden_annotated_field {
        return Err(DecodeError::HiddenFieldAnnotated { record: schema.type_name });
    }

    let mut wrote_non_zero = false;
    for field in &schema.fields {
        match field.access {
            FieldAccess::Nested(setter) => {
                wrote_non_zero |= setter(target, values, config).map_err(|e| e.within(field.path))?;
            }
            FieldAccess::Value(setter) => {
                let raw = match values.get(field.name) {
                    Some(raw) if !raw.is_empty() => raw,
                    _ => continue,
                };
                if !field.shape.is_supported() {
                    return Err(DecodeError::UnsupportedShape(field.shape.to_string()).within(field.path));
                }
                if is_blank_for(&field.shape, raw) {
                    log::trace!("{}.{} blank, left unchanged", schema.type_name, field.path);
                    continue;
                }
                log::trace!("{}.{} <- {:?}", schema.type_name, field.path, raw);
                wrote_non_zero |= setter(target, raw, config).map_err(|e| e.within(field.path))?;
            }
        }
    }

    Ok(wrote_non_zero)
}

/// Decode a nested record field in place
///
/// Called by derived accessors; the nested record reads the same keys as
/// its parent. Returns whether any of its fields received a non-zero value.
pub fn decode_nested<T: QueryRecord>(
    field: &mut T,
    values: &RawValues,
    config: &DecodeConfig,
) -> DecodeResult<bool> {
    decode_record(values, field, config)
}

/// Decode an optional nested record field
///
/// An existing record is decoded in place and kept. An empty field gets a
/// fresh record which is stored only if one of its keys, at any depth,
/// parsed to a non-zero value. The record's own `Default` plays no part, so
/// a record with non-zero defaults still stays absent when none of its keys
/// carried a value. A fresh record whose decode fails is dropped.
pub fn decode_optional_nested<T: QueryRecord>(
    field: &mut Option<T>,
    values: &RawValues,
    config: &DecodeConfig,
) -> DecodeResult<bool> {
    if let Some(existing) = field.as_mut() {
        return decode_record(values, existing, config);
    }

    let mut fresh = T::default();
    if decode_record(values, &mut fresh, config)? {
        *field = Some(fresh);
        Ok(true)
    } else {
        log::trace!("{} received no non-zero value, left empty", T::TYPE_NAME);
        Ok(false)
    }
}

/// A decoder with an explicit configuration
///
/// ```ignore
/// let decoder = Decoder::new(DecodeConfig::default().with_separator(';'));
/// decoder.decode_url("/search?tags=a;b", &mut search)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn decode<R: QueryRecord>(&self, values: &RawValues, target: &mut R) -> DecodeResult<()> {
        decode_record(values, target, &self.config)
            .map(|_| ())
            .map_err(|e| e.in_record(R::TYPE_NAME))
    }

    /// Decode the query component of `uri`
    pub fn decode_url<R: QueryRecord>(&self, uri: &str, target: &mut R) -> DecodeResult<()> {
        let values = crate::adapter::values_from_uri(uri)?;
        self.decode(&values, target)
    }

    /// Decode the query component of a request's URI
    pub fn decode_request<B, R: QueryRecord>(
        &self,
        request: &http::Request<B>,
        target: &mut R,
    ) -> DecodeResult<()> {
        let values = crate::adapter::values_from_request(request);
        self.decode(&values, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryRecord;

    #[derive(QueryRecord, Default, Debug, PartialEq)]
    struct Pagination {
        #[qp("limit")]
        pub limit: u32,
        #[qp("offset")]
        pub offset: u32,
    }

    #[derive(QueryRecord, Default, Debug, PartialEq)]
    struct Search {
        #[qp("q")]
        pub query: String,
        #[qp("page")]
        pub page: i32,
        pub pagination: Pagination,
        pub window: Option<Pagination>,
    }

    #[derive(QueryRecord, Default)]
    struct Sneaky {
        #[qp("q")]
        pub query: String,
        #[qp("secret")]
        #[allow(dead_code)]
        secret: String,
    }

    #[derive(QueryRecord, Default)]
    struct Grid {
        #[qp("cells")]
        pub cells: Vec<Vec<u8>>,
    }

    #[derive(QueryRecord, Debug, PartialEq)]
    struct Paging {
        #[qp("size")]
        pub size: u32,
        #[qp("cursor")]
        pub cursor: Option<String>,
    }

    impl Default for Paging {
        fn default() -> Self {
            Self { size: 20, cursor: None }
        }
    }

    #[derive(QueryRecord, Default, Debug, PartialEq)]
    struct Feed {
        #[qp("q")]
        pub query: String,
        pub paging: Option<Paging>,
    }

    fn values(pairs: &[(&str, &str)]) -> RawValues {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_flat_and_nested_keys() {
        let mut search = Search::default();
        decode(&values(&[("q", "rust"), ("page", "2"), ("limit", "50")]), &mut search).unwrap();

        assert_eq!(search.query, "rust");
        assert_eq!(search.page, 2);
        assert_eq!(search.pagination.limit, 50);
        // Same flat namespace, so the optional copy sees the key too
        assert_eq!(search.window, Some(Pagination { limit: 50, offset: 0 }));
    }

    #[test]
    fn test_optional_nested_stays_empty() {
        let mut search = Search::default();
        decode(&values(&[("q", "rust")]), &mut search).unwrap();
        assert_eq!(search.window, None);
    }

    #[test]
    fn test_optional_nested_collapses_zero() {
        let mut search = Search::default();
        decode(&values(&[("limit", "0")]), &mut search).unwrap();
        assert_eq!(search.window, None);
    }

    #[test]
    fn test_custom_default_not_allocated_without_keys() {
        let mut feed = Feed::default();
        decode(&values(&[("q", "x")]), &mut feed).unwrap();
        assert_eq!(feed.paging, None);

        decode(&values(&[("size", "0"), ("cursor", "")]), &mut feed).unwrap();
        assert_eq!(feed.paging, None);
    }

    #[test]
    fn test_custom_default_kept_when_key_present() {
        let mut feed = Feed::default();
        decode(&values(&[("cursor", "abc")]), &mut feed).unwrap();
        assert_eq!(feed.paging, Some(Paging { size: 20, cursor: Some("abc".into()) }));
    }

    #[test]
    fn test_failed_fresh_record_dropped() {
        let mut feed = Feed::default();
        let err = decode(&values(&[("cursor", "abc"), ("size", "big")]), &mut feed).unwrap_err();
        assert_eq!(err.path(), Some("Feed.paging.size"));
        assert_eq!(feed.paging, None);
    }

    #[test]
    fn test_existing_optional_kept() {
        let mut search = Search { window: Some(Pagination::default()), ..Default::default() };
        decode(&values(&[("q", "rust")]), &mut search).unwrap();
        assert_eq!(search.window, Some(Pagination::default()));
    }

    #[test]
    fn test_nested_error_path() {
        let mut search = Search::default();
        let err = decode(&values(&[("limit", "-1")]), &mut search).unwrap_err();
        assert_eq!(err.path(), Some("Search.pagination.limit"));
        assert!(err.is_invalid_value());
    }

    #[test]
    fn test_partial_writes_kept() {
        let mut search = Search::default();
        let err = decode(&values(&[("q", "kept"), ("page", "x")]), &mut search).unwrap_err();
        assert_eq!(err.path(), Some("Search.page"));
        assert_eq!(search.query, "kept");
    }

    #[test]
    fn test_hidden_annotated_field() {
        let mut sneaky = Sneaky::default();
        let err = decode(&values(&[("q", "x")]), &mut sneaky).unwrap_err();
        assert_eq!(err, DecodeError::HiddenFieldAnnotated { record: "Sneaky" });
        assert!(sneaky.query.is_empty());
    }

    #[test]
    fn test_unsupported_shape_only_when_present() {
        let mut grid = Grid::default();
        decode(&values(&[("other", "1")]), &mut grid).unwrap();

        let err = decode(&values(&[("cells", "1")]), &mut grid).unwrap_err();
        assert_eq!(err.path(), Some("Grid.cells"));
        assert_eq!(err.root_cause(), &DecodeError::UnsupportedShape("Vec<Vec<u8>>".into()));
    }

    #[test]
    fn test_decoder_separator() {
        #[derive(QueryRecord, Default)]
        struct Tags {
            #[qp("tags")]
            pub tags: Vec<String>,
        }

        let decoder = Decoder::new(DecodeConfig::default().with_separator(';'));
        let mut tags = Tags::default();
        decoder.decode(&values(&[("tags", "a;b, c;")]), &mut tags).unwrap();
        assert_eq!(tags.tags, vec!["a", "b, c"]);
    }
}
