use std::any::Any;
use std::collections::HashMap;

/// Identifies one memoized result: the operation, the fingerprints of the
/// frames it read, and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: &'static str,
    inputs: Vec<String>,
    params: String,
}

impl CacheKey {
    pub fn new(operation: &'static str, inputs: Vec<String>, params: impl Into<String>) -> Self {
        Self {
            operation,
            inputs,
            params: params.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Default)]
pub struct ReportCache {
    entries: HashMap<CacheKey, Box<dyn Any + Send + Sync>>,
    hits: u64,
    misses: u64,
}

impl ReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: Clone + 'static>(&mut self, key: &CacheKey) -> Option<T> {
        match self.entries.get(key).and_then(|v| v.downcast_ref::<T>()) {
            Some(value) => {
                self.hits += 1;
                tracing::debug!("Cache hit for {}", key.operation);
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert<T: Send + Sync + 'static>(&mut self, key: CacheKey, value: T) {
        self.entries.insert(key, Box::new(value));
    }

    pub fn invalidate_all(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!("Invalidating {} cached result(s)", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

impl std::fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCache")
            .field("entries", &self.entries.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
