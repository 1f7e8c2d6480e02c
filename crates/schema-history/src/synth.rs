// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decode-only type synthesis from persisted generation metadata.
//!
//! The synthesizer turns a [`SchemaGeneration`] into a [`TypeDescription`]:
//! the minimum needed to decode records written under that generation, with
//! no business logic from the application type. Turning that description into
//! an instantiable type is the job of a platform-specific
//! [`TypeMaterializer`], supplied by the caller.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, SchemaError};
use crate::generation::SchemaGeneration;

/// Coarse classification of a resolved type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Scalar or codec-backed value with stored bytes.
    Value,
    /// Lazily evaluated query over other records. Never stored.
    Query,
    /// Reference to another record type (join). Never stored.
    Relation,
}

impl TypeKind {
    pub fn is_persistent(self) -> bool {
        matches!(self, Self::Value)
    }
}

/// A type as resolved by a [`LoadingContext`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeHandle {
    pub name: String,
    pub kind: TypeKind,
}

impl TypeHandle {
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Value,
        }
    }
}

/// Failure to locate a named type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot resolve type {type_name}: {reason}")]
pub struct ResolveError {
    pub type_name: String,
    pub reason: String,
}

impl From<ResolveError> for SchemaError {
    fn from(err: ResolveError) -> Self {
        SchemaError::Support(err.to_string())
    }
}

/// Resolves type names to handles.
pub trait LoadingContext: Send + Sync {
    fn resolve(&self, type_name: &str) -> std::result::Result<TypeHandle, ResolveError>;
}

/// Built-in scalar names understood by [`BuiltinTypes`].
pub const SCALAR_TYPES: &[&str] = &[
    "bool", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "float32",
    "float64", "string", "bytes", "timestamp",
];

/// Loading context over the built-in scalars plus registered extra types.
#[derive(Debug, Clone, Default)]
pub struct BuiltinTypes {
    extra: BTreeMap<String, TypeKind>,
}

impl BuiltinTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application value type.
    pub fn with_value(mut self, name: impl Into<String>) -> Self {
        self.extra.insert(name.into(), TypeKind::Value);
        self
    }

    /// Register a query type.
    pub fn with_query(mut self, name: impl Into<String>) -> Self {
        self.extra.insert(name.into(), TypeKind::Query);
        self
    }

    /// Register a relation (record reference) type.
    pub fn with_relation(mut self, name: impl Into<String>) -> Self {
        self.extra.insert(name.into(), TypeKind::Relation);
        self
    }
}

impl LoadingContext for BuiltinTypes {
    fn resolve(&self, type_name: &str) -> std::result::Result<TypeHandle, ResolveError> {
        if SCALAR_TYPES.contains(&type_name) {
            return Ok(TypeHandle::value(type_name));
        }
        match self.extra.get(type_name) {
            Some(kind) => Ok(TypeHandle {
                name: type_name.to_string(),
                kind: *kind,
            }),
            None => Err(ResolveError {
                type_name: type_name.to_string(),
                reason: "not a built-in or registered type".to_string(),
            }),
        }
    }
}

/// One field of a synthesized type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SynthesizedField {
    pub name: String,
    pub type_handle: TypeHandle,
    pub nullable: bool,
    pub is_version: bool,
    /// Codec (adapter) descriptor attached to the field accessor.
    pub codec: Option<String>,
}

/// Minimal, decode-only structural description of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescription {
    /// External name; always the generation's type name.
    pub name: String,
    /// False: several generations may synthesize the same name without
    /// colliding in the loading context.
    pub explicit: bool,
    /// Encodes the same way as the evolvable application type.
    pub evolvable: bool,
    /// Fields in ordinal order.
    pub fields: Vec<SynthesizedField>,
    /// Primary-key field names in ordinal order. May be empty.
    pub primary_key: Vec<String>,
}

impl TypeDescription {
    pub fn field(&self, name: &str) -> Option<&SynthesizedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

impl fmt::Display for TypeDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ ", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field.name, field.type_handle.name)?;
            if field.nullable {
                write!(f, "?")?;
            }
        }
        write!(f, " }}")
    }
}

/// Platform capability that turns a description into an instantiable type.
pub trait TypeMaterializer: Send + Sync {
    fn materialize(
        &self,
        description: &TypeDescription,
        context: &dyn LoadingContext,
    ) -> std::result::Result<TypeHandle, String>;
}

/// Pure transform from a generation to its decode-only description.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeSynthesizer;

impl TypeSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Synthesize the description of `generation`.
    ///
    /// Properties whose type resolves to a query or relation are dropped:
    /// older layouts could capture join fields by mistake and those carry no
    /// stored bytes.
    pub fn synthesize(
        &self,
        generation: &SchemaGeneration,
        context: &dyn LoadingContext,
    ) -> Result<TypeDescription> {
        let properties = generation.properties()?;

        let mut fields = Vec::with_capacity(properties.len());
        let mut primary_key = Vec::new();

        for property in properties {
            let handle = context.resolve(&property.type_name)?;
            if !handle.kind.is_persistent() {
                log::debug!(
                    "[TypeSynthesizer::synthesize] {}: skipping {:?} property {}",
                    generation,
                    handle.kind,
                    property.name
                );
                continue;
            }

            if property.is_primary_key_member {
                primary_key.push(property.name.clone());
            }

            fields.push(SynthesizedField {
                name: property.name.clone(),
                type_handle: handle,
                nullable: property.nullable,
                is_version: property.is_version,
                codec: property.codec_descriptor(),
            });
        }

        Ok(TypeDescription {
            name: generation.type_name().to_string(),
            explicit: false,
            evolvable: true,
            fields,
            primary_key,
        })
    }
}

/// Structural equality of two generations. See
/// [`SchemaGeneration::structurally_equal`].
pub fn structurally_equal(a: &SchemaGeneration, b: &SchemaGeneration) -> Result<bool> {
    a.structurally_equal(b)
}
