// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by the registry, the synthesizer and the stores.

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced by the schema history core.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// An exact-match lookup matched zero records.
    #[error("not found: {0}")]
    NotFound(String),

    /// Reading from the persistence substrate failed.
    #[error("fetch failed: {message}")]
    Fetch {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Inserting into the persistence substrate failed.
    #[error("persist failed: {message}")]
    Persist {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The platform could not resolve or materialize a synthesized type.
    #[error("unsupported: {0}")]
    Support(String),

    /// Caller bug: an operation was invoked on an object in the wrong state.
    #[error("illegal state: {0}")]
    State(String),
}

impl SchemaError {
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
            source: None,
        }
    }

    pub fn fetch_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist {
            message: message.into(),
            source: None,
        }
    }

    pub fn persist_with<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persist {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for the distinguished "no such record" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::fetch_with(format!("record decoding error: {}", err), err)
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
