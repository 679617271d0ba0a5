//! Benchmark function registry.
//!
//! Maps benchmark names to the opaque `(bytes) -> u64` functions under
//! test. Built once at startup, read-only afterwards. Registration order is
//! preserved so reports always list benchmarks in a deterministic order.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;

/// The plugin signature every benchmark function must satisfy: a pure
/// function from a byte buffer to a fixed-width integer.
pub type BenchmarkFn = Arc<dyn Fn(&[u8]) -> u64 + Send + Sync>;

/// A named benchmark function.
#[derive(Clone)]
pub struct BenchmarkEntry {
    name: String,
    func: BenchmarkFn,
}

impl BenchmarkEntry {
    /// The benchmark's registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function under test.
    pub fn func(&self) -> &BenchmarkFn {
        &self.func
    }

    /// Invoke the function under test directly.
    pub fn call(&self, data: &[u8]) -> u64 {
        (self.func)(data)
    }
}

impl fmt::Debug for BenchmarkEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Ordered registry of benchmark functions.
#[derive(Debug, Default)]
pub struct BenchmarkRegistry {
    entries: Vec<BenchmarkEntry>,
}

impl BenchmarkRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a benchmark function under a unique name.
    /// Duplicate registration is a configuration error - fatal at startup.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        func: impl Fn(&[u8]) -> u64 + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        let name = name.into();

        if self.entries.iter().any(|e| e.name == name) {
            return Err(ConfigError::DuplicateBenchmark { name });
        }

        self.entries.push(BenchmarkEntry {
            name,
            func: Arc::new(func),
        });
        Ok(())
    }

    /// Look up a benchmark function by name.
    pub fn lookup(&self, name: &str) -> Result<BenchmarkFn, ConfigError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Arc::clone(&e.func))
            .ok_or_else(|| ConfigError::BenchmarkNotFound {
                name: name.to_string(),
            })
    }

    /// All registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[BenchmarkEntry] {
        &self.entries
    }

    /// Check if a benchmark is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Number of registered benchmarks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a sub-registry containing only the named benchmarks, keeping
    /// the requested order. Unknown names are configuration errors.
    pub fn filtered(&self, names: &[String]) -> Result<Self, ConfigError> {
        let mut filtered = Self::new();
        for name in names {
            let func = self.lookup(name)?;
            filtered.entries.push(BenchmarkEntry {
                name: name.clone(),
                func,
            });
        }
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_registry() -> BenchmarkRegistry {
        let mut registry = BenchmarkRegistry::new();
        registry.register("len", |data| data.len() as u64).unwrap();
        registry.register("first", |data| u64::from(data[0])).unwrap();
        registry.register("one", |_| 1).unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = make_registry();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("len"));

        let func = registry.lookup("len").unwrap();
        assert_eq!(func(b"hash"), 4);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = make_registry();
        let result = registry.register("len", |_| 0);
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateBenchmark { .. })
        ));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_lookup_unknown_name() {
        let registry = make_registry();
        assert!(matches!(
            registry.lookup("missing"),
            Err(ConfigError::BenchmarkNotFound { .. })
        ));
    }

    #[test]
    fn test_names_preserve_registration_order() {
        let registry = make_registry();
        assert_eq!(registry.names(), vec!["len", "first", "one"]);
    }

    #[test]
    fn test_filtered_keeps_requested_order() {
        let registry = make_registry();
        let filtered = registry
            .filtered(&["one".to_string(), "len".to_string()])
            .unwrap();
        assert_eq!(filtered.names(), vec!["one", "len"]);

        let result = registry.filtered(&["missing".to_string()]);
        assert!(matches!(
            result,
            Err(ConfigError::BenchmarkNotFound { .. })
        ));
    }
}
