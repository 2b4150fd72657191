// src/engine/registry.rs

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::errors::{ProcscriptError, Result};
use crate::exec::ManagedProcess;

/// Launched processes that have not been stopped yet, keyed by step name.
///
/// Only the orchestrator's control task touches the registry, so there is no
/// locking.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    running: HashMap<String, ManagedProcess>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.running.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Names of all registered processes, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.running.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn get(&self, name: &str) -> Option<&ManagedProcess> {
        self.running.get(name)
    }

    /// Whether the process registered under `name` is still alive, or `None`
    /// if no such process is registered. Asks the OS; does not unregister
    /// a process that has exited.
    pub fn is_running(&mut self, name: &str) -> Option<bool> {
        self.running.get_mut(name).map(ManagedProcess::is_running)
    }

    /// Register `process` under `name`; the name must be free.
    pub fn insert(&mut self, name: String, process: ManagedProcess) -> Result<&mut ManagedProcess> {
        match self.running.entry(name) {
            Entry::Occupied(e) => Err(ProcscriptError::DuplicateProcessName(e.key().clone())),
            Entry::Vacant(e) => Ok(e.insert(process)),
        }
    }

    /// Take the process registered under `name` out of the registry.
    pub fn remove(&mut self, name: &str) -> Result<ManagedProcess> {
        self.running
            .remove(name)
            .ok_or_else(|| ProcscriptError::UnknownProcessName(name.to_string()))
    }
}
