//! Task identifier interning.
//!
//! Maps task identifier strings to dense integer indices. Tasks are interned in
//! input order, so a task's index is also the index of its edge in the
//! dependency graph and predecessor lookups never scan the edge list.

use rustc_hash::FxHashMap;

/// Interned task index (u32 for compact storage and fast hashing).
pub type TaskIdInt = u32;

/// Interner mapping task identifiers to their position in the task list.
#[derive(Debug, Clone)]
pub struct TaskIdInterner {
    to_int: FxHashMap<String, TaskIdInt>,
}

impl TaskIdInterner {
    /// Create a new interner with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            to_int: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Intern a new identifier and return its index.
    ///
    /// Identifiers must be unique: if `s` was already interned, nothing changes
    /// and the existing index is returned as the error.
    pub fn try_insert(&mut self, s: &str) -> Result<TaskIdInt, TaskIdInt> {
        if let Some(&id) = self.to_int.get(s) {
            return Err(id);
        }
        let id = self.to_int.len() as TaskIdInt;
        self.to_int.insert(s.to_string(), id);
        Ok(id)
    }

    /// Get the index for an identifier, if it exists.
    #[inline]
    pub fn get(&self, s: &str) -> Option<TaskIdInt> {
        self.to_int.get(s).copied()
    }
}

impl Default for TaskIdInterner {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
