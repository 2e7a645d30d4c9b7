//! Record schemas and the process-wide schema cache
//!
//! A [`StructSchema`] is the ordered list of decodable fields of one record
//! type. `#[derive(QueryRecord)]` generates [`QueryRecord::describe`]; the
//! decoder never calls it directly but goes through [`schema_for`], which
//! builds each schema once and keeps it for the life of the process.

use crate::config::DecodeConfig;
use crate::error::DecodeResult;
use crate::shape::TypeShape;
use crate::values::RawValues;
use scc::HashMap as SccHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// A struct that can be decoded from query values
///
/// Implement it with `#[derive(QueryRecord)]`.
pub trait QueryRecord: Default + 'static {
    /// Diagnostic label, the struct's name
    const TYPE_NAME: &'static str;

    /// Build the field descriptors. Called once per type by [`schema_for`].
    fn describe() -> StructSchema<Self>;

    /// True when every decodable field holds its zero value
    fn is_zero(&self) -> bool;
}

/// Writes coerced raw values into one field. Returns whether the stored
/// value is non-zero.
pub type ValueSetter<R> = fn(&mut R, &[String], &DecodeConfig) -> DecodeResult<bool>;

/// Decodes a nested record field from the full value map. Returns whether
/// any descendant field received a non-zero value.
pub type NestedSetter<R> = fn(&mut R, &RawValues, &DecodeConfig) -> DecodeResult<bool>;

pub enum FieldAccess<R> {
    Value(ValueSetter<R>),
    Nested(NestedSetter<R>),
}

impl<R> Clone for FieldAccess<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for FieldAccess<R> {}

/// One decodable field of a record type
pub struct FieldDescriptor<R> {
    /// External key; for nested fields, the field identifier
    pub name: &'static str,
    /// Field identifier within the record
    pub path: &'static str,
    pub shape: TypeShape,
    /// No external key; decoded as a flattened nested record
    pub nested: bool,
    pub access: FieldAccess<R>,
}

impl<R> FieldDescriptor<R> {
    pub fn value(name: &'static str, path: &'static str, shape: TypeShape, setter: ValueSetter<R>) -> Self {
        Self { name, path, shape, nested: false, access: FieldAccess::Value(setter) }
    }

    pub fn nested(path: &'static str, shape: TypeShape, setter: NestedSetter<R>) -> Self {
        Self { name: path, path, shape, nested: true, access: FieldAccess::Nested(setter) }
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("shape", &self.shape)
            .field("nested", &self.nested)
            .finish()
    }
}

/// Field list of one record type; immutable once built
pub struct StructSchema<R> {
    pub type_name: &'static str,
    pub fields: Vec<FieldDescriptor<R>>,
    /// A non-public field carries an external key
    pub has_hidden_annotated_field: bool,
}

impl<R> StructSchema<R> {
    pub fn new(
        type_name: &'static str,
        fields: Vec<FieldDescriptor<R>>,
        has_hidden_annotated_field: bool,
    ) -> Self {
        Self { type_name, fields, has_hidden_annotated_field }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<R>> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl<R> fmt::Debug for StructSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructSchema")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .field("has_hidden_annotated_field", &self.has_hidden_annotated_field)
            .finish()
    }
}

type SchemaCache = SccHashMap<TypeId, Arc<dyn Any + Send + Sync>>;

fn cache() -> &'static SchemaCache {
    static SCHEMAS: OnceLock<SchemaCache> = OnceLock::new();
    SCHEMAS.get_or_init(SccHashMap::new)
}

fn build<R: QueryRecord>() -> Arc<StructSchema<R>> {
    let schema = R::describe();
    log::debug!(
        "built query schema for {} ({} fields{})",
        schema.type_name,
        schema.fields.len(),
        if schema.has_hidden_annotated_field { ", hidden annotated fields" } else { "" }
    );
    Arc::new(schema)
}

/// Schema for `R`, built on first use and cached for the process lifetime
///
/// Cache hits take a shared read. Only a miss locks the bucket, so a type's
/// schema is built once even when many threads ask for it together.
pub fn schema_for<R: QueryRecord>() -> Arc<StructSchema<R>> {
    let key = TypeId::of::<R>();

    let cached = cache().read_sync(&key, |_, schema| Arc::clone(schema));
    if let Some(Ok(schema)) = cached.map(|erased| erased.downcast::<StructSchema<R>>()) {
        return schema;
    }

    match cache().entry_sync(key) {
        scc::hash_map::Entry::Occupied(o) => match Arc::clone(o.get()).downcast() {
            Ok(schema) => schema,
            Err(_) => build::<R>(),
        },
        scc::hash_map::Entry::Vacant(v) => {
            let schema = build::<R>();
            let erased: Arc<dyn Any + Send + Sync> = schema.clone();
            v.insert_entry(erased);
            schema
        }
    }
}

/// Number of record types with a cached schema
pub fn cached_schema_count() -> usize {
    cache().len()
}
