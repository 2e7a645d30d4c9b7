//! Type coercion
//!
//! [`FromQuery`] turns the raw values of one key into a typed field value.
//! The implementation is picked by the field's type when the derive runs,
//! so there is no per-call switch over kinds:
//!
//! - scalars ([`QueryScalar`]) use the first raw value only
//! - `Option<T>` is `None` when every raw value is empty
//! - `Vec<T>` splits every raw value on the configured separator, trims the
//!   pieces, drops empty ones and coerces each remaining piece
//!
//! The decode engine never calls an optional or sequence coercion with only
//! empty values; such a key leaves the field as it was.

use crate::config::DecodeConfig;
use crate::error::{DecodeError, DecodeResult};
use crate::shape::{PrimitiveKind, TypeShape};
use crate::time::parse_timestamp_with;
use chrono::{DateTime, FixedOffset, Utc};
use std::num::IntErrorKind;

/// A field type that can be decoded from the raw values of one key
pub trait FromQuery: Sized {
    fn shape() -> TypeShape;

    /// `raw` holds every value for the key, in order; it is never empty.
    fn from_query(raw: &[String], config: &DecodeConfig) -> DecodeResult<Self>;

    /// Decode a single sequence element
    fn from_query_one(raw: &str, config: &DecodeConfig) -> DecodeResult<Self> {
        Self::from_query(&[raw.to_string()], config)
    }

    /// True when the value equals the type's zero value
    fn is_zero(&self) -> bool;
}

/// A type parsed from exactly one string
pub trait QueryScalar: Sized {
    fn parse_scalar(raw: &str, config: &DecodeConfig) -> DecodeResult<Self>;
}

/// [`FromQuery::from_query`] for scalars: parse the first raw value
pub fn scalar_from_query<T: QueryScalar>(raw: &[String], config: &DecodeConfig) -> DecodeResult<T> {
    let first = raw.first().map(String::as_str).unwrap_or_default();
    T::parse_scalar(first, config)
}

/// Implement [`FromQuery`] for a type that implements [`QueryScalar`],
/// `Default` and `PartialEq`.
///
/// ```rust,ignore
/// struct Color(u8, u8, u8);
/// impl QueryScalar for Color { /* ... */ }
/// qparam_core::query_scalar!(Color);
/// ```
#[macro_export]
macro_rules! query_scalar {
    ($ty:ty) => {
        $crate::query_scalar!($ty, $crate::TypeShape::Custom(stringify!($ty)));
    };
    ($ty:ty, $shape:expr) => {
        impl $crate::FromQuery for $ty {
            fn shape() -> $crate::TypeShape {
                $shape
            }

            fn from_query(
                raw: &[::std::string::String],
                config: &$crate::DecodeConfig,
            ) -> $crate::DecodeResult<Self> {
                $crate::scalar_from_query(raw, config)
            }

            fn from_query_one(raw: &str, config: &$crate::DecodeConfig) -> $crate::DecodeResult<Self> {
                <$ty as $crate::QueryScalar>::parse_scalar(raw, config)
            }

            fn is_zero(&self) -> bool {
                *self == <$ty as ::std::default::Default>::default()
            }
        }
    };
}

fn int_error(err: &std::num::ParseIntError, raw: &str) -> DecodeError {
    match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => DecodeError::OutOfRange(raw.to_string()),
        _ => DecodeError::InvalidValue(raw.to_string()),
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl QueryScalar for $ty {
                fn parse_scalar(raw: &str, _config: &DecodeConfig) -> DecodeResult<Self> {
                    raw.parse::<$ty>().map_err(|e| int_error(&e, raw))
                }
            }

            query_scalar!($ty, TypeShape::Primitive(PrimitiveKind::$kind));
        )*
    };
}

impl_integer! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

fn is_explicit_infinity(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

macro_rules! impl_float {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl QueryScalar for $ty {
                fn parse_scalar(raw: &str, _config: &DecodeConfig) -> DecodeResult<Self> {
                    let value = raw
                        .parse::<$ty>()
                        .map_err(|_| DecodeError::InvalidValue(raw.to_string()))?;
                    // Rust rounds overflowing literals to infinity instead of failing
                    if value.is_infinite() && !is_explicit_infinity(raw) {
                        return Err(DecodeError::OutOfRange(raw.to_string()));
                    }
                    Ok(value)
                }
            }

            query_scalar!($ty, TypeShape::Primitive(PrimitiveKind::$kind));
        )*
    };
}

impl_float! {
    f32 => F32,
    f64 => F64,
}

impl QueryScalar for bool {
    fn parse_scalar(raw: &str, _config: &DecodeConfig) -> DecodeResult<Self> {
        match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(DecodeError::InvalidValue(raw.to_string())),
        }
    }
}

query_scalar!(bool, TypeShape::Primitive(PrimitiveKind::Bool));

impl QueryScalar for String {
    fn parse_scalar(raw: &str, _config: &DecodeConfig) -> DecodeResult<Self> {
        Ok(raw.to_string())
    }
}

query_scalar!(String, TypeShape::Primitive(PrimitiveKind::String));

impl QueryScalar for DateTime<FixedOffset> {
    fn parse_scalar(raw: &str, config: &DecodeConfig) -> DecodeResult<Self> {
        parse_timestamp_with(raw, config.repair_offsets)
    }
}

impl QueryScalar for DateTime<Utc> {
    fn parse_scalar(raw: &str, config: &DecodeConfig) -> DecodeResult<Self> {
        parse_timestamp_with(raw, config.repair_offsets).map(|t| t.with_timezone(&Utc))
    }
}

macro_rules! impl_timestamp {
    ($($ty:ty),*) => {
        $(
            impl FromQuery for $ty {
                fn shape() -> TypeShape {
                    TypeShape::Timestamp
                }

                fn from_query(raw: &[String], config: &DecodeConfig) -> DecodeResult<Self> {
                    scalar_from_query(raw, config)
                }

                fn from_query_one(raw: &str, config: &DecodeConfig) -> DecodeResult<Self> {
                    <$ty as QueryScalar>::parse_scalar(raw, config)
                }

                fn is_zero(&self) -> bool {
                    self.timestamp() == 0 && self.timestamp_subsec_nanos() == 0
                }
            }
        )*
    };
}

impl_timestamp!(DateTime<FixedOffset>, DateTime<Utc>);

impl<T: FromQuery> FromQuery for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::optional(T::shape())
    }

    fn from_query(raw: &[String], config: &DecodeConfig) -> DecodeResult<Self> {
        if raw.iter().all(String::is_empty) {
            return Ok(None);
        }
        T::from_query(raw, config).map(Some)
    }

    fn from_query_one(raw: &str, config: &DecodeConfig) -> DecodeResult<Self> {
        if raw.is_empty() {
            return Ok(None);
        }
        T::from_query_one(raw, config).map(Some)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: FromQuery> FromQuery for Vec<T> {
    fn shape() -> TypeShape {
        TypeShape::sequence(T::shape())
    }

    fn from_query(raw: &[String], config: &DecodeConfig) -> DecodeResult<Self> {
        raw.iter()
            .flat_map(|value| value.split(config.separator))
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .enumerate()
            .map(|(index, piece)| T::from_query_one(piece, config).map_err(|e| e.at_index(index)))
            .collect()
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}
