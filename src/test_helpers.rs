//! Shared test utilities for the notegarden test suite.
//!
//! Fixture vaults are built directly in a temp directory from a flat list of
//! `(relative path, contents)` pairs. The vault root is always a `garden/`
//! subdirectory of the temp dir — tempfile's own directory names start with
//! a dot, which the scanner would treat as hidden, and a fixed root name
//! keeps assertions about the root page deterministic.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::vault_dir;
//!
//! let tmp = vault_dir(&[
//!     ("Sourdough.md", "# Sourdough"),
//!     ("Recipes/Pancakes.md", "..."),
//! ]);
//! let vault = scan(tmp.path(), "media").unwrap();
//! assert_eq!(vault.root, "garden");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temp directory holding a fixture vault at `garden/`.
pub struct VaultDir {
    tmp: TempDir,
    root: PathBuf,
}

impl VaultDir {
    /// Path of the vault root (`<tmp>/garden`).
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of the enclosing temp directory, for output directories and
    /// other fixtures outside the vault.
    pub fn base(&self) -> &Path {
        self.tmp.path()
    }
}

/// Build a fixture vault from `(relative path, contents)` pairs.
///
/// Parent directories are created as needed, so a nested note implies its
/// directories: `("Recipes/Pancakes.md", "...")` creates `Recipes/`.
pub fn vault_dir(files: &[(&str, &str)]) -> VaultDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("garden");
    fs::create_dir_all(&root).unwrap();
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    VaultDir { tmp, root }
}
