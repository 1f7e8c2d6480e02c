// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Informational comparison of two generations.
//!
//! Nothing here migrates data; the report only says whether records written
//! under one generation can be decoded under the other.

use std::collections::HashMap;

use crate::error::Result;
use crate::generation::SchemaGeneration;
use crate::property::PropertyDescriptor;

// ---------------------------------------------------------------------------
// Compatibility level
// ---------------------------------------------------------------------------

/// Describes how two generations relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Same stored shape (identical, or properties only reordered).
    Full,
    /// The newer generation can read records written by the older one.
    Backward,
    /// The older generation can read records written by the newer one.
    Forward,
    /// The generations are incompatible.
    Breaking,
}

// ---------------------------------------------------------------------------
// CompatibilityResult
// ---------------------------------------------------------------------------

/// Detailed result of a compatibility check between two generations.
#[derive(Debug, Clone)]
pub struct CompatibilityResult {
    /// Overall compatibility level.
    pub compatibility: Compatibility,
    /// Human-readable details about what changed.
    pub details: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare `old` against `new`.
///
/// Added properties make the change backward compatible, removed ones
/// forward compatible, both together breaking. A change of declared type,
/// nullability, key membership or codec on a surviving property is
/// breaking. Fails only when either generation's properties cannot be
/// loaded.
pub fn check_compatibility(
    old: &SchemaGeneration,
    new: &SchemaGeneration,
) -> Result<CompatibilityResult> {
    if old.type_name() != new.type_name() {
        return Ok(CompatibilityResult {
            compatibility: Compatibility::Breaking,
            details: vec![format!(
                "different types: {} -> {}",
                old.type_name(),
                new.type_name()
            )],
        });
    }

    let old_props = old.properties()?;
    let new_props = new.properties()?;

    if old_props == new_props {
        return Ok(CompatibilityResult {
            compatibility: Compatibility::Full,
            details: vec!["generations are identical".to_string()],
        });
    }

    Ok(compare(old_props, new_props))
}

fn compare(
    old_props: &[PropertyDescriptor],
    new_props: &[PropertyDescriptor],
) -> CompatibilityResult {
    let old_map: HashMap<&str, &PropertyDescriptor> =
        old_props.iter().map(|p| (p.name.as_str(), p)).collect();
    let new_map: HashMap<&str, &PropertyDescriptor> =
        new_props.iter().map(|p| (p.name.as_str(), p)).collect();

    let mut details = Vec::new();
    let mut has_added = false;
    let mut has_removed = false;
    let mut has_breaking_change = false;

    for np in new_props {
        if !old_map.contains_key(np.name.as_str()) {
            details.push(format!("added property: {} {}", np.type_name, np.name));
            has_added = true;
        }
    }

    for op in old_props {
        let Some(np) = new_map.get(op.name.as_str()) else {
            details.push(format!("removed property: {} {}", op.type_name, op.name));
            has_removed = true;
            continue;
        };

        if op.type_name != np.type_name {
            details.push(format!(
                "changed type of {}: {} -> {}",
                op.name, op.type_name, np.type_name
            ));
            has_breaking_change = true;
        }
        if op.nullable != np.nullable {
            details.push(format!(
                "changed nullability of {}: {} -> {}",
                op.name, op.nullable, np.nullable
            ));
            has_breaking_change = true;
        }
        if op.is_primary_key_member != np.is_primary_key_member {
            details.push(format!("changed key membership of {}", op.name));
            has_breaking_change = true;
        }
        if op.codec_descriptor() != np.codec_descriptor() {
            details.push(format!("changed codec of {}", op.name));
            has_breaking_change = true;
        }
        if op.is_version != np.is_version {
            details.push(format!("changed version flag of {}", op.name));
        }
        if op.ordinal != np.ordinal {
            details.push(format!(
                "moved {}: ordinal {} -> {}",
                op.name, op.ordinal, np.ordinal
            ));
        }
    }

    let compatibility = if has_breaking_change || (has_added && has_removed) {
        Compatibility::Breaking
    } else if has_added {
        Compatibility::Backward
    } else if has_removed {
        Compatibility::Forward
    } else {
        Compatibility::Full
    };

    CompatibilityResult {
        compatibility,
        details,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
