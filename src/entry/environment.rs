//! Request environment capture
//!
//! Scrubbing a request's variables down to the allow-list happens once per
//! request context; every entry reported under that context shares the
//! same snapshot.
//!
//! ## Retention
//! The cache never evicts on its own. It is sized by the number of live
//! request contexts, so whoever owns a context calls `release` when the
//! request finishes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::Environment;

/// Request variables copied into an entry's environment
pub const ALLOWED_ENV: [&str; 4] = [
    "HTTP_HOST",
    "REQUEST_URI",
    "REQUEST_METHOD",
    "HTTP_USER_AGENT",
];

/// The execution context an entry is reported from
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Identity of the context; snapshots are memoized by it
    pub id: u64,

    /// Raw request variables, unscrubbed
    pub vars: HashMap<String, String>,
}

impl RequestContext {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            vars: HashMap::new(),
        }
    }

    /// Add a request variable
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Copy the allow-listed variables that are present
    pub fn scrub(&self) -> Environment {
        ALLOWED_ENV
            .iter()
            .filter_map(|name| {
                self.vars
                    .get(*name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }
}

/// Memoized environment snapshots keyed by context identity
#[derive(Debug, Default)]
pub struct EnvironmentCache {
    snapshots: RwLock<HashMap<u64, Arc<Environment>>>,
}

impl EnvironmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the snapshot for a context, scrubbing it on first use
    pub fn snapshot(&self, context: &RequestContext) -> Arc<Environment> {
        if let Some(existing) = self.snapshots.read().get(&context.id) {
            return Arc::clone(existing);
        }

        let mut snapshots = self.snapshots.write();
        Arc::clone(
            snapshots
                .entry(context.id)
                .or_insert_with(|| Arc::new(context.scrub())),
        )
    }

    /// Forget a finished context
    pub fn release(&self, id: u64) -> bool {
        self.snapshots.write().remove(&id).is_some()
    }

    /// Number of memoized contexts
    pub fn len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.read().is_empty()
    }
}
