//! Named service directory.
//!
//! Maps service names to shared [`Object`]s. A directory is an ordinary
//! value: whoever needs one gets it passed in, there is no process-wide
//! instance.

use corelib::ObjectRef;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dispatch::Object;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("service name already registered: {0}")]
    NameTaken(String),

    #[error("no service named {0}")]
    UnknownService(String),
}

#[derive(Debug, Default)]
pub struct Directory {
    services: DashMap<String, Arc<Object>>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `name`. Fails if the name is taken.
    pub fn register(
        &self,
        name: impl Into<String>,
        object: Arc<Object>,
    ) -> Result<ObjectRef, DirectoryError> {
        let name = name.into();
        match self.services.entry(name) {
            Entry::Occupied(entry) => Err(DirectoryError::NameTaken(entry.key().clone())),
            Entry::Vacant(entry) => {
                let id = object.id();
                info!(service = %entry.key(), object = %id, "registered service");
                entry.insert(object);
                Ok(id)
            }
        }
    }

    /// Remove `name`, handing back its object. The object is not disposed.
    pub fn unregister(&self, name: &str) -> Option<Arc<Object>> {
        let removed = self.services.remove(name).map(|(_, object)| object);
        if removed.is_some() {
            debug!(service = name, "unregistered service");
        }
        removed
    }

    pub fn service(&self, name: &str) -> Result<Arc<Object>, DirectoryError> {
        self.services
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| DirectoryError::UnknownService(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
