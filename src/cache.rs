//! Two-state cache for derived programs.

use std::sync::Arc;

/// A derived artifact that is either current or must be rebuilt.
#[derive(Debug, Clone)]
pub enum Cache<T> {
    Stale,
    Valid(Arc<T>),
}

impl<T> Default for Cache<T> {
    fn default() -> Self {
        Cache::Stale
    }
}

impl<T> Cache<T> {
    /// The cached value, if current.
    pub fn get(&self) -> Option<Arc<T>> {
        match self {
            Cache::Valid(value) => Some(Arc::clone(value)),
            Cache::Stale => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Cache::Valid(_))
    }

    pub fn invalidate(&mut self) {
        *self = Cache::Stale;
    }

    /// Store a freshly built value and return a handle to it.
    pub fn set(&mut self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        *self = Cache::Valid(Arc::clone(&value));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_states() {
        let mut cache = Cache::default();
        assert!(cache.get().is_none());

        let stored = cache.set(3);
        let fetched = cache.get().unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));

        cache.invalidate();
        assert!(!cache.is_valid());
    }
}
