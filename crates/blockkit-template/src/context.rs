/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Render context: the key-value bindings a template is rendered against.
//!
//! Loop iterations create child contexts that layer loop-local bindings over
//! their parent without copying it.

use crate::path::PropertyPath;
use crate::value::{ObjectMap, Value};
use std::sync::Arc;

/// Variable bindings for a render, with parent scopes for loop iterations.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    bindings: ObjectMap,
    parent: Option<Arc<RenderContext>>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object; any other JSON value yields an
    /// empty context.
    pub fn from_json(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Object(bindings) => Self {
                bindings,
                parent: None,
            },
            _ => Self::default(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a key, checking parent scopes.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings
            .get(key)
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(key)))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// A child scope whose lookups fall back to this context.
    pub fn child(&self) -> RenderContext {
        RenderContext {
            bindings: ObjectMap::new(),
            parent: Some(Arc::new(self.clone())),
        }
    }

    /// Every visible key, outermost scope first; inner bindings shadow outer ones.
    pub fn keys(&self) -> Vec<String> {
        match self.to_value() {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Flatten all scopes into a single object value.
    pub fn to_value(&self) -> Value {
        let mut flat = match &self.parent {
            Some(parent) => match parent.to_value() {
                Value::Object(map) => map,
                _ => ObjectMap::new(),
            },
            None => ObjectMap::new(),
        };
        for (key, value) in &self.bindings {
            flat.replace(key.clone(), value.clone());
        }
        Value::Object(flat)
    }

    /// Resolve a property path; anything missing is `undefined`.
    pub fn resolve(&self, path: &PropertyPath) -> Value {
        let root = self.get(path.root()).cloned().unwrap_or_default();
        path.resolve_from(root)
    }
}

impl From<ObjectMap> for RenderContext {
    fn from(bindings: ObjectMap) -> Self {
        Self {
            bindings,
            parent: None,
        }
    }
}
