// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Description of a record type as the running application defines it today.
//!
//! A [`LiveType`] is the input of the write path: the registry snapshots it
//! into a new, uncommitted generation.

/// One field of a live record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveProperty {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
    pub is_version: bool,
    pub is_primary_key_member: bool,
    /// Join/relation-only field. Never persisted, never snapshotted.
    pub is_join: bool,
    pub adapter_type_name: Option<String>,
    pub adapter_params: Option<String>,
}

impl LiveProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: false,
            is_version: false,
            is_primary_key_member: false,
            is_join: false,
            adapter_type_name: None,
            adapter_params: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn version(mut self) -> Self {
        self.is_version = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key_member = true;
        self
    }

    pub fn join(mut self) -> Self {
        self.is_join = true;
        self
    }

    pub fn adapter(mut self, type_name: impl Into<String>) -> Self {
        self.adapter_type_name = Some(type_name.into());
        self
    }

    pub fn adapter_params(mut self, params: impl Into<String>) -> Self {
        self.adapter_params = Some(params.into());
        self
    }
}

/// Field set of a record type, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveType {
    pub type_name: String,
    pub properties: Vec<LiveProperty>,
}

impl LiveType {
    pub fn builder(type_name: impl Into<String>) -> LiveTypeBuilder {
        LiveTypeBuilder {
            type_name: type_name.into(),
            properties: Vec::new(),
        }
    }

    /// Properties that carry stored bytes (join fields excluded).
    pub fn persistent_properties(&self) -> impl Iterator<Item = &LiveProperty> {
        self.properties.iter().filter(|p| !p.is_join)
    }
}

/// Fluent builder for [`LiveType`].
#[derive(Debug)]
pub struct LiveTypeBuilder {
    type_name: String,
    properties: Vec<LiveProperty>,
}

impl LiveTypeBuilder {
    pub fn property(mut self, property: LiveProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn build(self) -> LiveType {
        LiveType {
            type_name: self.type_name,
            properties: self.properties,
        }
    }
}

/// Implemented by Rust record types that can describe their own layout.
pub trait DescribeLayout {
    fn live_type() -> LiveType;
}
