use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

use crate::ClassPrediction;

use super::backend::ClassifierBackend;

/// Thread-safe registry of classifier backends.
///
/// Backends are wrapped in `Mutex` because `ClassifierBackend::classify`
/// takes `&mut self`.
pub struct BackendRegistry {
    backends: HashMap<String, Arc<Mutex<dyn ClassifierBackend>>>,
    default_name: Option<String>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
            default_name: None,
        }
    }

    /// Register a backend. The first registered backend becomes the default.
    pub fn register<B: ClassifierBackend + 'static>(&mut self, backend: B) {
        let name = backend.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.backends.insert(name, Arc::new(Mutex::new(backend)));
    }

    /// Set default backend by name.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.backends.contains_key(name) {
            return Err(anyhow!("backend '{}' not registered", name));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Mutex<dyn ClassifierBackend>>> {
        self.backends.get(name).cloned()
    }

    pub fn default_backend(&self) -> Option<Arc<Mutex<dyn ClassifierBackend>>> {
        self.default_name.as_ref().and_then(|name| self.get(name))
    }

    /// List registered backends.
    pub fn list(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Classify one frame using the default backend.
    pub fn classify(&self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<ClassPrediction>> {
        let backend = self
            .default_backend()
            .ok_or_else(|| anyhow!("no classifier backend registered"))?;
        let mut guard = backend
            .lock()
            .map_err(|_| anyhow!("classifier backend lock poisoned"))?;
        guard.classify(pixels, width, height)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
