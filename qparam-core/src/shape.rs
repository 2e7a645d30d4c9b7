//! Type shapes
//!
//! A [`TypeShape`] classifies a field's type for coercion. Shapes are
//! computed once when a record's schema is built and are used for two
//! things: rejecting unsupported nestings before any value is coerced, and
//! diagnostics.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "String",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::Isize => "isize",
            PrimitiveKind::U8 => "u8",
            PrimitiveKind::U16 => "u16",
            PrimitiveKind::U32 => "u32",
            PrimitiveKind::U64 => "u64",
            PrimitiveKind::Usize => "usize",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Primitive(PrimitiveKind),
    Optional(Box<TypeShape>),
    Sequence(Box<TypeShape>),
    /// A nested record, by type name
    Nested(&'static str),
    Timestamp,
    /// A user scalar registered with [`crate::query_scalar!`]
    Custom(&'static str),
}

impl TypeShape {
    pub fn optional(inner: TypeShape) -> Self {
        TypeShape::Optional(Box::new(inner))
    }

    pub fn sequence(elem: TypeShape) -> Self {
        TypeShape::Sequence(Box::new(elem))
    }

    /// Leaf shapes parse from a single string
    pub fn is_scalar(&self) -> bool {
        matches!(self, TypeShape::Primitive(_) | TypeShape::Timestamp | TypeShape::Custom(_))
    }

    /// One optional level, one sequence level; sequence elements must be
    /// scalars, optionally wrapped.
    pub fn is_supported(&self) -> bool {
        match self {
            TypeShape::Optional(inner) => {
                !matches!(**inner, TypeShape::Optional(_)) && inner.is_supported()
            }
            TypeShape::Sequence(elem) => match &**elem {
                TypeShape::Optional(inner) => inner.is_scalar(),
                other => other.is_scalar(),
            },
            _ => true,
        }
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Primitive(kind) => f.write_str(kind.as_str()),
            TypeShape::Optional(inner) => write!(f, "Option<{}>", inner),
            TypeShape::Sequence(elem) => write!(f, "Vec<{}>", elem),
            TypeShape::Nested(name) | TypeShape::Custom(name) => f.write_str(name),
            TypeShape::Timestamp => f.write_str("timestamp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_shapes() {
        let int = TypeShape::Primitive(PrimitiveKind::I32);
        assert!(int.is_supported());
        assert!(TypeShape::optional(int.clone()).is_supported());
        assert!(TypeShape::sequence(int.clone()).is_supported());
        assert!(TypeShape::optional(TypeShape::sequence(int.clone())).is_supported());
        assert!(TypeShape::sequence(TypeShape::optional(int.clone())).is_supported());
        assert!(TypeShape::optional(TypeShape::Nested("Pagination")).is_supported());
    }

    #[test]
    fn test_unsupported_shapes() {
        let int = TypeShape::Primitive(PrimitiveKind::I32);
        assert!(!TypeShape::sequence(TypeShape::sequence(int.clone())).is_supported());
        assert!(!TypeShape::optional(TypeShape::optional(int.clone())).is_supported());
        assert!(!TypeShape::sequence(TypeShape::optional(TypeShape::sequence(int))).is_supported());
        assert!(!TypeShape::sequence(TypeShape::Nested("Pagination")).is_supported());
    }

    #[test]
    fn test_display() {
        let shape = TypeShape::optional(TypeShape::sequence(TypeShape::Primitive(PrimitiveKind::U8)));
        assert_eq!(shape.to_string(), "Option<Vec<u8>>");
        assert_eq!(TypeShape::Timestamp.to_string(), "timestamp");
    }
}
