//! Field type classification
//!
//! The derive only sees tokens, so "is this field a nested record" is
//! answered by name: a path type whose last segment is not a known scalar,
//! string, timestamp or container is treated as a record.

use syn::{GenericArgument, PathArguments, Type, TypePath};

const KNOWN_TYPES: &[&str] = &[
    // scalars
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64",
    // containers
    "Vec", "VecDeque", "HashMap", "BTreeMap", "HashSet", "BTreeSet", "Option", "Box", "Rc", "Arc",
    "Cow",
    // time and misc std / chrono
    "DateTime", "NaiveDateTime", "NaiveDate", "NaiveTime", "Duration", "SystemTime", "Instant",
    "PathBuf", "PhantomData", "Uuid", "IpAddr", "Ipv4Addr", "Ipv6Addr", "SocketAddr",
];

/// A field type that decodes as a nested record
#[derive(Debug, Clone)]
pub struct RecordType<'a> {
    /// The record type itself, with any `Option` peeled off
    pub ty: &'a Type,
    pub optional: bool,
}

fn last_segment(path: &TypePath) -> Option<&syn::PathSegment> {
    if path.qself.is_some() {
        return None;
    }
    path.path.segments.last()
}

/// `T` for `Option<T>`
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = last_segment(path)?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(GenericArgument::Type(inner)) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn is_record_path(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => last_segment(path)
            .map(|segment| !KNOWN_TYPES.contains(&segment.ident.to_string().as_str()))
            .unwrap_or(false),
        Type::Group(group) => is_record_path(&group.elem),
        Type::Paren(paren) => is_record_path(&paren.elem),
        _ => false,
    }
}

/// Classify an unannotated field type
pub fn record_type(ty: &Type) -> Option<RecordType<'_>> {
    if let Some(inner) = option_inner(ty) {
        return is_record_path(inner).then_some(RecordType { ty: inner, optional: true });
    }
    is_record_path(ty).then_some(RecordType { ty, optional: false })
}

/// Classify a `#[qp(nested)]` field type; any type is accepted
pub fn forced_record_type(ty: &Type) -> RecordType<'_> {
    match option_inner(ty) {
        Some(inner) => RecordType { ty: inner, optional: true },
        None => RecordType { ty, optional: false },
    }
}
