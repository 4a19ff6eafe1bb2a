//! In-memory inspector constructor registry with query support.

use crate::error::{InspectError, Result};
use crate::inspector::{Inspector, InspectorInfo};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use stratus_cloud::ResourceApi;
use stratus_core::ServiceCategory;
use tracing::{debug, warn};

/// Options handed to inspector constructors.
///
/// Carries the shared handles a fresh inspector needs; cloning is cheap
/// (`Arc` bumps only).
#[derive(Clone)]
pub struct InspectorOptions {
    /// Handle to the external resource-management API
    pub api: Arc<dyn ResourceApi>,
}

impl InspectorOptions {
    /// Create options around an API handle.
    #[must_use]
    pub fn new(api: Arc<dyn ResourceApi>) -> Self {
        Self { api }
    }
}

/// Constructor function producing a fresh inspector per invocation.
pub type InspectorCtor = Arc<dyn Fn(&InspectorOptions) -> Result<Box<dyn Inspector>> + Send + Sync>;

/// Process-wide catalog mapping a service category to an inspector
/// constructor.
///
/// The registry is explicitly constructed and passed where needed; there is
/// no implicit global instance, so tests build their own. Keys are
/// normalized through [`ServiceCategory`], which makes every lookup
/// case-insensitive.
#[derive(Clone)]
pub struct InspectorRegistry {
    entries: Arc<RwLock<HashMap<String, InspectorCtor>>>,
}

impl InspectorRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a constructor for a service category.
    ///
    /// Overwrites any existing entry for the same normalized key
    /// (last-write-wins, no merge).
    ///
    /// # Errors
    /// Returns a validation error if the category is empty or malformed.
    pub fn register(&self, category: &str, ctor: InspectorCtor) -> Result<()> {
        let key = ServiceCategory::new(category)?;

        let mut entries = self
            .entries
            .write()
            .expect("acquire write lock on registry entries");

        let replaced = entries.insert(key.as_str().to_string(), ctor).is_some();

        if replaced {
            debug!(category = %key, "replaced inspector constructor");
        } else {
            debug!(category = %key, "registered inspector constructor");
        }

        Ok(())
    }

    /// Look up the constructor for a category.
    ///
    /// Case-insensitive; returns `None` on a miss or on a malformed
    /// category string — this is a query, not a command.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<InspectorCtor> {
        let key = ServiceCategory::new(category).ok()?;

        let entries = self
            .entries
            .read()
            .expect("acquire read lock on registry entries");

        entries.get(key.as_str()).cloned()
    }

    /// Look up and instantiate an inspector for a category.
    ///
    /// # Errors
    /// Returns `NotFound` if no constructor is registered; constructor
    /// failures propagate.
    pub fn create(&self, category: &str, options: &InspectorOptions) -> Result<Box<dyn Inspector>> {
        let ctor = self.get(category).ok_or_else(|| InspectError::NotFound {
            category: category.to_string(),
        })?;

        ctor(options)
    }

    /// Remove one entry.
    ///
    /// Returns `true` if the category was present, `false` otherwise.
    pub fn unregister(&self, category: &str) -> bool {
        let Ok(key) = ServiceCategory::new(category) else {
            return false;
        };

        let mut entries = self
            .entries
            .write()
            .expect("acquire write lock on registry entries");

        let removed = entries.remove(key.as_str()).is_some();

        if removed {
            debug!(category = %key, "unregistered inspector constructor");
        }

        removed
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .expect("acquire write lock on registry entries");

        entries.clear();
    }

    /// Check if a category is registered.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Number of registered categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .expect("acquire read lock on registry entries")
            .len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered category keys, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .expect("acquire read lock on registry entries")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Collect the self-description of every registered inspector.
    ///
    /// Each inspector is instantiated transiently; one whose construction
    /// fails is logged and excluded rather than aborting the whole listing.
    #[must_use]
    pub fn list_info(&self, options: &InspectorOptions) -> Vec<InspectorInfo> {
        let snapshot: Vec<(String, InspectorCtor)> = {
            let entries = self
                .entries
                .read()
                .expect("acquire read lock on registry entries");
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        };

        let mut infos: Vec<InspectorInfo> = snapshot
            .into_iter()
            .filter_map(|(category, ctor)| match ctor(options) {
                Ok(inspector) => Some(inspector.info()),
                Err(e) => {
                    warn!(category = %category, "excluding inspector from listing: {e}");
                    None
                }
            })
            .collect();

        infos.sort_by(|a, b| a.service_category.as_str().cmp(b.service_category.as_str()));
        infos
    }
}

impl Default for InspectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
