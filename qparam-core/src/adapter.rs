//! URI and HTTP request entry points
//!
//! Both extract the query component into [`RawValues`] and forward to the
//! decode engine with the default configuration. Use [`crate::Decoder`] for
//! anything else.

use crate::decode::Decoder;
use crate::error::{DecodeError, DecodeResult};
use crate::schema::QueryRecord;
use crate::values::RawValues;
use http::Uri;

/// Decode the query string of `uri` into `target`
///
/// Accepts absolute URIs (`https://example.com/search?q=rust`), origin-form
/// paths (`/search?q=rust`) and relative references (`search?q=rust`,
/// `?q=rust`). A URI without a query decodes an empty value set.
pub fn decode_url<R: QueryRecord>(uri: &str, target: &mut R) -> DecodeResult<()> {
    Decoder::default().decode_url(uri, target)
}

/// Decode the query string of an HTTP request's URI into `target`
pub fn decode_request<B, R: QueryRecord>(request: &http::Request<B>, target: &mut R) -> DecodeResult<()> {
    Decoder::default().decode_request(request, target)
}

pub(crate) fn values_from_uri(uri: &str) -> DecodeResult<RawValues> {
    match uri.parse::<Uri>() {
        Ok(parsed) => Ok(query_values(&parsed)),
        Err(e) => {
            log::trace!("{:?} is not an http URI ({}), reading it as a reference", uri, e);
            reference_values(uri)
        }
    }
}

fn malformed(uri: &str, reason: &str) -> DecodeError {
    DecodeError::MalformedUri(format!("{}: {}", uri, reason))
}

/// RFC 3986 scheme: a letter, then letters, digits, `+`, `-` or `.`
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Lenient split for URI references `http::Uri` refuses, such as relative
/// paths or a query holding raw spaces
fn reference_values(uri: &str) -> DecodeResult<RawValues> {
    if uri.chars().any(|c| c.is_ascii_control()) {
        return Err(malformed(uri, "invalid control character"));
    }

    let without_fragment = uri.split_once('#').map_or(uri, |(head, _)| head);
    let (reference, query) = match without_fragment.split_once('?') {
        Some((reference, query)) => (reference, Some(query)),
        None => (without_fragment, None),
    };

    let first_segment = reference.split('/').next().unwrap_or_default();
    if let Some((scheme, _)) = first_segment.split_once(':') {
        if !is_scheme(scheme) {
            return Err(malformed(uri, "invalid scheme"));
        }
    }

    Ok(query.map(RawValues::parse_query).unwrap_or_default())
}

pub(crate) fn values_from_request<B>(request: &http::Request<B>) -> RawValues {
    query_values(request.uri())
}

fn query_values(uri: &Uri) -> RawValues {
    uri.query().map(RawValues::parse_query).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_from_absolute_uri() {
        let values = values_from_uri("https://example.com/search?q=rust&tags=a,b&tags=c").unwrap();
        assert_eq!(values.first("q"), Some("rust"));
        assert_eq!(values.get("tags").map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_values_from_origin_form() {
        let values = values_from_uri("/search?page=3").unwrap();
        assert_eq!(values.first("page"), Some("3"));
    }

    #[test]
    fn test_no_query_is_empty() {
        assert!(values_from_uri("https://example.com/search").unwrap().is_empty());
    }

    #[test]
    fn test_values_from_relative_references() {
        assert_eq!(values_from_uri("?q=1").unwrap().first("q"), Some("1"));
        assert_eq!(values_from_uri("search?q=1").unwrap().first("q"), Some("1"));
        assert_eq!(values_from_uri("/s?q=a b#top").unwrap().first("q"), Some("a b"));
        assert!(values_from_uri("search#q=1").unwrap().is_empty());
    }

    #[test]
    fn test_control_characters_rejected() {
        assert!(matches!(values_from_uri("/s?q=a\nb"), Err(DecodeError::MalformedUri(_))));
    }

    #[test]
    fn test_scheme_detection() {
        assert!(is_scheme("https"));
        assert!(is_scheme("svn+ssh"));
        assert!(!is_scheme("ht@tp"));
        assert!(!is_scheme("1http"));
        assert!(!is_scheme(""));
    }

    #[test]
    fn test_malformed_uri() {
        let err = values_from_uri("ht@tp://example.com?q=1").unwrap_err();
        match err {
            DecodeError::MalformedUri(msg) => assert!(msg.starts_with("ht@tp://example.com?q=1")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_values_from_request() {
        let request = http::Request::builder()
            .uri("http://localhost/items?limit=10&offset=20")
            .body(())
            .unwrap();
        let values = values_from_request(&request);
        assert_eq!(values.first("limit"), Some("10"));
        assert_eq!(values.first("offset"), Some("20"));
    }
}
