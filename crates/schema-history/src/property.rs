// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-field metadata captured for one generation.

use serde::{Deserialize, Serialize};

/// Description of a single field of one schema generation.
///
/// Every field participates in equality: two generations only compare equal
/// when their descriptors match element-wise, adapters included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Field name, unique within the generation.
    pub name: String,
    /// Declared type, by name. Resolved later through a loading context.
    pub type_name: String,
    pub nullable: bool,
    /// Field used for optimistic-concurrency versioning.
    pub is_version: bool,
    pub is_primary_key_member: bool,
    /// Position within the generation, `0..n-1`.
    pub ordinal: u32,
    /// Optional value transform applied to the stored representation.
    pub adapter_type_name: Option<String>,
    /// Opaque adapter descriptor blob.
    pub adapter_params: Option<String>,
}

impl PropertyDescriptor {
    /// Create a plain, non-null, non-key property.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, ordinal: u32) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: false,
            is_version: false,
            is_primary_key_member: false,
            ordinal,
            adapter_type_name: None,
            adapter_params: None,
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn version(mut self, is_version: bool) -> Self {
        self.is_version = is_version;
        self
    }

    pub fn primary_key(mut self, member: bool) -> Self {
        self.is_primary_key_member = member;
        self
    }

    pub fn adapter(mut self, type_name: impl Into<String>, params: Option<String>) -> Self {
        self.adapter_type_name = Some(type_name.into());
        self.adapter_params = params;
        self
    }

    /// Codec descriptor to attach to the synthesized field, if any.
    ///
    /// Stored parameters are used verbatim; an adapter recorded without
    /// parameters gets the canonical empty-parameter descriptor.
    pub fn codec_descriptor(&self) -> Option<String> {
        let adapter = self.adapter_type_name.as_deref()?;
        Some(match &self.adapter_params {
            Some(params) => params.clone(),
            None => plain_descriptor(adapter),
        })
    }
}

/// Canonical descriptor of an adapter annotation that carries no parameters.
///
/// `com.acme.UpperCaseAdapter` becomes `@Lcom/acme/UpperCaseAdapter;)`.
pub fn plain_descriptor(adapter_type_name: &str) -> String {
    let mut desc = String::with_capacity(adapter_type_name.len() + 4);
    desc.push_str("@L");
    desc.extend(
        adapter_type_name
            .chars()
            .map(|c| if c == '.' { '/' } else { c }),
    );
    desc.push_str(";)");
    desc
}

/// Check that ordinals form `0..n-1` in order and names are unique.
pub(crate) fn check_ordinals(properties: &[PropertyDescriptor]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::with_capacity(properties.len());
    for (index, property) in properties.iter().enumerate() {
        if property.ordinal as usize != index {
            return Err(format!(
                "property {} has ordinal {} at position {}",
                property.name, property.ordinal, index
            ));
        }
        if !seen.insert(property.name.as_str()) {
            return Err(format!("duplicate property name {}", property.name));
        }
    }
    Ok(())
}
