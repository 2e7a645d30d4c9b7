//! Decode errors
//!
//! Every failure that escapes [`crate::decode`] is a [`DecodeError`]. Field
//! level failures are wrapped in [`DecodeError::Field`] so the caller can see
//! which record, field and (for sequences) element the bad input hit:
//!
//! ```text
//! failed to parse "Search.tags[1]": out of range: 300
//! ```

/// Decode result type
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error type for query decoding
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A non-public field carries a `#[qp("...")]` key. Always a caller mistake.
    #[error("{record} has non-public fields annotated with qp")]
    HiddenFieldAnnotated { record: &'static str },
    /// The literal is not valid syntax for the target type
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// The literal is numeric but does not fit the target type
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// The target type has no coercion rule
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),
    /// The URI handed to [`crate::decode_url`] could not be parsed
    #[error("malformed uri: {0}")]
    MalformedUri(String),
    /// A failure located at a dotted field path
    #[error("failed to parse {path:?}: {source}")]
    Field {
        path: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Prefix this error's path with `segment`.
    ///
    /// A bare error becomes a [`DecodeError::Field`] located at `segment`;
    /// an existing field error gets `segment` prepended. Segments starting
    /// with `[` (sequence indexes) are glued on without a dot.
    pub fn within(self, segment: &str) -> Self {
        match self {
            DecodeError::Field { path, source } => {
                DecodeError::Field { path: join_path(segment, &path), source }
            }
            other => DecodeError::Field { path: segment.to_string(), source: Box::new(other) },
        }
    }

    /// Prefix an existing field path with the record name; other errors pass through.
    pub(crate) fn in_record(self, record: &str) -> Self {
        match self {
            err @ DecodeError::Field { .. } => err.within(record),
            other => other,
        }
    }

    /// Locate this error at element `index` of a sequence
    pub(crate) fn at_index(self, index: usize) -> Self {
        self.within(&format!("[{}]", index))
    }

    /// The innermost, non-path error
    pub fn root_cause(&self) -> &DecodeError {
        let mut current = self;
        while let DecodeError::Field { source, .. } = current {
            current = source;
        }
        current
    }

    /// Dotted path of the failing field, if the error is located
    pub fn path(&self) -> Option<&str> {
        match self {
            DecodeError::Field { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self.root_cause(), DecodeError::OutOfRange(_))
    }

    pub fn is_invalid_value(&self) -> bool {
        matches!(self.root_cause(), DecodeError::InvalidValue(_))
    }
}

fn join_path(segment: &str, rest: &str) -> String {
    if rest.is_empty() {
        segment.to_string()
    } else if segment.is_empty() {
        rest.to_string()
    } else if rest.starts_with('[') {
        format!("{}{}", segment, rest)
    } else {
        format!("{}.{}", segment, rest)
    }
}
