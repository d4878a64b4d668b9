//! Test registry
//!
//! Test functions are registered once at startup as ordered
//! `(name, function)` pairs grouped by file path. The runner only ever works
//! from this table.

use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use crate::commands::Commands;
use crate::{Error, Result};

/// A registered test function
pub type TestFn = Arc<dyn Fn(Commands) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// One named test function
#[derive(Clone)]
pub struct TestCase {
    pub name: String,
    pub func: TestFn,
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// Ordered test functions of one file
#[derive(Debug, Clone)]
pub struct TestFile {
    pub path: String,
    pub cases: Vec<TestCase>,
}

impl TestFile {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            cases: Vec::new(),
        }
    }

    /// Register a test function
    pub fn case<F, Fut>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(Commands) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let func: TestFn = Arc::new(move |cmd| func(cmd).boxed());
        self.cases.push(TestCase {
            name: name.to_string(),
            func,
        });
        self
    }

    /// Function names in registration order
    pub fn functions(&self) -> Vec<String> {
        self.cases.iter().map(|c| c.name.clone()).collect()
    }
}

/// Every registered test file, in registration order
#[derive(Debug, Clone, Default)]
pub struct TestRegistry {
    files: Vec<TestFile>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, replacing an earlier one with the same path
    pub fn register(mut self, file: TestFile) -> Self {
        match self.files.iter_mut().find(|f| f.path == file.path) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
        self
    }

    pub fn get(&self, path: &str) -> Result<&TestFile> {
        self.files
            .iter()
            .find(|f| f.path == path)
            .ok_or_else(|| Error::TestFileNotFound(path.to_string()))
    }

    /// Function names of one file
    pub fn functions(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.get(path)?.functions())
    }

    pub fn files(&self) -> &[TestFile] {
        &self.files
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Files whose path lies under `dir`
    pub fn files_under(&self, dir: &str) -> Vec<&TestFile> {
        let dir = Path::new(dir);
        self.files
            .iter()
            .filter(|f| Path::new(&f.path).starts_with(dir))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TestRegistry {
        TestRegistry::new()
            .register(
                TestFile::new("suites/login.rs")
                    .case("test_valid_login", |_| async { Ok(()) })
                    .case("test_invalid_login", |_| async { Ok(()) }),
            )
            .register(
                TestFile::new("suites/forms/checkboxes.rs").case("test_check", |_| async { Ok(()) }),
            )
            .register(TestFile::new("smoke/home.rs").case("test_home", |_| async { Ok(()) }))
    }

    #[test]
    fn test_functions_keep_registration_order() {
        let registry = registry();
        assert_eq!(
            registry.functions("suites/login.rs").unwrap(),
            vec!["test_valid_login", "test_invalid_login"]
        );
        assert!(matches!(
            registry.functions("suites/nope.rs"),
            Err(Error::TestFileNotFound(_))
        ));
    }

    #[test]
    fn test_files_under_directory() {
        let registry = registry();
        let paths: Vec<&str> = registry
            .files_under("suites")
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(paths, vec!["suites/login.rs", "suites/forms/checkboxes.rs"]);
        assert!(registry.files_under("suite").is_empty());
    }

    #[test]
    fn test_register_replaces_same_path() {
        let registry = registry().register(TestFile::new("smoke/home.rs"));
        assert_eq!(registry.files().len(), 3);
        assert!(registry.functions("smoke/home.rs").unwrap().is_empty());
    }
}
