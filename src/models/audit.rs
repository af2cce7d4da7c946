//! Audit entries and the actor performing a change

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of state change being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn verb(self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }

    /// Full action tag for a resource kind, e.g. `UPDATE_BOOK`
    pub fn tag(self, kind: &str) -> String {
        format!("{}_{}", self.verb(), kind)
    }
}

/// Identity on whose behalf a mutation runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable record of one state-changing action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub action: String,
    pub actor: String,
    pub details: Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: String, actor: &Actor, details: Value) -> Self {
        Self {
            action,
            actor: actor.as_str().to_string(),
            details,
            recorded_at: super::record::now(),
        }
    }
}
