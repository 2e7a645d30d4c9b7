//! Raw query values
//!
//! [`RawValues`] is the only thing the decoder consumes: a map from key to
//! every value seen for that key, in order of appearance.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawValues {
    inner: HashMap<String, Vec<String>>,
}

impl RawValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string
    ///
    /// `+` decodes to a space, `%XX` escapes are percent-decoded, a key
    /// without `=` gets an empty value and empty pairs are skipped.
    pub fn parse_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut values = Self::new();

        for pair in query.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            values.append(form_decode(key), form_decode(value));
        }

        values
    }

    /// Add a value after any existing values for `key`
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Replace all values for `key`
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) -> Option<Vec<String>> {
        self.inner.insert(key.into(), values)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.inner.get(key).map(Vec::as_slice)
    }

    /// First value for `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.inner.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl From<HashMap<String, Vec<String>>> for RawValues {
    fn from(inner: HashMap<String, Vec<String>>) -> Self {
        Self { inner }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.append(key, value);
        }
        values
    }
}

/// Form decoding: `+` is a space, then percent-decode. Invalid UTF-8 keeps the raw text.
fn form_decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
