//! Vault scanning: one walk over the input tree.
//!
//! The scanner turns a directory of notes into the three tables everything
//! downstream runs on: pages, navigation, and media. It is the only place
//! that touches directory structure; after [`scan`] returns, the rest of the
//! pipeline works purely on names.
//!
//! ## Vault Layout
//!
//! ```text
//! garden/                      # Input root → the index page
//! ├── garden.md                # Root description file (optional)
//! ├── Sourdough.md             # Leaf note → sourdough.html
//! ├── Recipes/                 # Directory → recipes.html
//! │   ├── Recipes.md           # Description file for Recipes/ (optional)
//! │   ├── Pancakes.md          # Nested note → pancakes.html
//! │   └── crumb.jpg            # Media → media/crumb.jpg
//! └── .obsidian/               # Hidden → skipped entirely
//! ```
//!
//! ## Rules
//!
//! - Any entry with a hidden (dot-prefixed) component is skipped.
//! - A markup file whose stem equals its parent directory's stem is that
//!   directory's *description file*: it becomes the directory page's source
//!   and is not registered as a page of its own.
//! - Every other markup file is a leaf page; every directory is a page. The
//!   root's output path is pinned to `index.html`.
//! - Non-markup files are media, destined for the media directory under a
//!   sanitized file name.
//! - Page names must be unique across the whole tree, whatever the nesting —
//!   the link table is flat. A repeat is [`ScanError::DuplicateName`].
//! - Entries are visited in byte-order of their file names, so children
//!   lists (and therefore output) are deterministic across platforms.

use crate::slug::sanitize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("the name '{0}' already exists elsewhere in the vault")]
    DuplicateName(String),
    #[error("input directory has no usable name: {0}")]
    InvalidRoot(PathBuf),
}

/// A navigable unit of output: one directory or one markup file.
#[derive(Debug, Clone)]
pub struct Page {
    /// Markup source. Absent for directories without a description file.
    pub source: Option<PathBuf>,
    /// Output path relative to the output directory. Always URL-safe.
    pub output: String,
}

/// Parent/child relationships for one page.
#[derive(Debug, Clone, Default)]
pub struct NavNode {
    /// Parent page name. `None` only for the root.
    pub parent: Option<String>,
    /// Child page names in scan order (until reordered by metadata).
    pub children: Vec<String>,
}

/// A non-markup file to copy verbatim into the media directory.
#[derive(Debug, Clone)]
pub struct MediaEntry {
    /// Logical name used in the link table: the full file name, extension
    /// included (`crumb.jpg`), since that is how embeds refer to it.
    pub name: String,
    pub source: PathBuf,
    /// Destination relative to the output directory, forward-slashed.
    pub url: String,
}

/// Everything one scan discovers. Built fresh per run, discarded after.
#[derive(Debug)]
pub struct Vault {
    /// Name of the root page (the input directory's stem).
    pub root: String,
    pub pages: BTreeMap<String, Page>,
    pub navigation: BTreeMap<String, NavNode>,
    pub media: Vec<MediaEntry>,
}

/// Walk `root` and build the page, navigation, and media tables.
pub fn scan(root: &Path, media_dir: &str) -> Result<Vault, ScanError> {
    let root_name = root_name(root)?;

    let mut pages: BTreeMap<String, Page> = BTreeMap::new();
    let mut navigation: BTreeMap<String, NavNode> = BTreeMap::new();
    let mut media: Vec<MediaEntry> = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        let depth = entry.depth();

        if entry.file_type().is_dir() {
            let name = if depth == 0 {
                root_name.clone()
            } else {
                stem_of(path)
            };
            let output = if depth == 0 {
                "index.html".to_string()
            } else {
                format!("{}.html", sanitize(&name))
            };
            register(
                &mut navigation,
                name.clone(),
                parent_of(path, depth, &root_name),
            )?;
            pages.insert(
                name,
                Page {
                    source: None,
                    output,
                },
            );
        } else if is_markup(path) {
            let name = stem_of(path);
            let parent = parent_of(path, depth, &root_name)
                .expect("markup files sit below the root directory");
            if name == parent {
                // Description file: becomes the parent directory's source.
                pages
                    .get_mut(&parent)
                    .expect("parent directory scanned before its contents")
                    .source = Some(path.to_path_buf());
                continue;
            }
            register(&mut navigation, name.clone(), Some(parent))?;
            pages.insert(
                name.clone(),
                Page {
                    source: Some(path.to_path_buf()),
                    output: format!("{}.html", sanitize(&name)),
                },
            );
        } else {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let stem = stem_of(path);
            let url = match path.extension() {
                Some(ext) => format!(
                    "{}/{}.{}",
                    media_dir,
                    sanitize(&stem),
                    ext.to_string_lossy()
                ),
                None => format!("{}/{}", media_dir, sanitize(&stem)),
            };
            media.push(MediaEntry {
                name: file_name,
                source: path.to_path_buf(),
                url,
            });
        }
    }

    Ok(Vault {
        root: root_name,
        pages,
        navigation,
        media,
    })
}

/// Record `name` in the navigation table under `parent`.
///
/// This is where global uniqueness is enforced: a name already present in
/// the table — at any depth, in any branch — aborts the scan.
fn register(
    navigation: &mut BTreeMap<String, NavNode>,
    name: String,
    parent: Option<String>,
) -> Result<(), ScanError> {
    if navigation.contains_key(&name) {
        return Err(ScanError::DuplicateName(name));
    }
    if let Some(parent_name) = &parent {
        navigation
            .get_mut(parent_name)
            .expect("parent directory scanned before its contents")
            .children
            .push(name.clone());
    }
    navigation.insert(
        name,
        NavNode {
            parent,
            children: Vec::new(),
        },
    );
    Ok(())
}

fn is_hidden(file_name: &std::ffi::OsStr) -> bool {
    file_name.to_string_lossy().starts_with('.')
}

fn is_markup(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Name of the entry's parent page: the root name for depth-1 entries,
/// otherwise the parent directory's stem.
fn parent_of(path: &Path, depth: usize, root_name: &str) -> Option<String> {
    match depth {
        0 => None,
        1 => Some(root_name.to_string()),
        _ => Some(stem_of(path.parent().expect("nested entries have parents"))),
    }
}

/// The root page takes its name from the input directory's stem. Paths like
/// `.` carry no stem, so fall back to the canonical path before giving up.
fn root_name(root: &Path) -> Result<String, ScanError> {
    if root.file_stem().is_some() {
        return Ok(stem_of(root));
    }
    let canonical = root.canonicalize()?;
    if canonical.file_stem().is_some() {
        Ok(stem_of(&canonical))
    } else {
        Err(ScanError::InvalidRoot(root.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::vault_dir;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn pages_count_directories_plus_notes() {
        let tmp = vault_dir(&[
            ("Sourdough.md", "# hi"),
            ("Recipes/Pancakes.md", "text"),
            ("Recipes/Waffles.md", "text"),
        ]);
        let vault = scan(tmp.path(), "media").unwrap();

        // root dir + Recipes dir + 3 notes
        assert_eq!(vault.pages.len(), 5);
        assert!(vault.media.is_empty());
    }

    #[test]
    fn root_output_is_index_html() {
        let tmp = vault_dir(&[("Note.md", "x")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.pages[&vault.root].output, "index.html");
    }

    #[test]
    fn note_output_paths_are_sanitized() {
        let tmp = vault_dir(&[("My Note!.md", "x")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.pages["My Note!"].output, "my_note_.html");
    }

    #[test]
    fn description_file_attaches_to_directory_page() {
        let tmp = vault_dir(&[
            ("Recipes/Recipes.md", "about recipes"),
            ("Recipes/Pancakes.md", "x"),
        ]);
        let vault = scan(tmp.path(), "media").unwrap();

        let recipes = &vault.pages["Recipes"];
        assert!(recipes.source.is_some());
        // The description file is not a page of its own: root, Recipes,
        // Pancakes and nothing else.
        assert_eq!(vault.pages.len(), 3);
        assert_eq!(vault.navigation["Recipes"].children, vec!["Pancakes"]);
    }

    #[test]
    fn root_description_file_attaches_to_root() {
        let tmp = vault_dir(&[("Note.md", "x"), ("garden.md", "welcome")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.root, "garden");
        assert!(vault.pages["garden"].source.is_some());
    }

    #[test]
    fn directory_without_description_has_no_source() {
        let tmp = vault_dir(&[("Recipes/Pancakes.md", "x")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert!(vault.pages["Recipes"].source.is_none());
    }

    #[test]
    fn duplicate_names_across_branches_error() {
        let tmp = vault_dir(&[("A/Notes.md", "x"), ("B/C/Notes.md", "y")]);
        let result = scan(tmp.path(), "media");
        assert!(matches!(result, Err(ScanError::DuplicateName(name)) if name == "Notes"));
    }

    #[test]
    fn duplicate_directory_and_note_error() {
        let tmp = vault_dir(&[("Recipes/deep/x.md", "x")]);
        fs::write(tmp.path().join("deep.md"), "y").unwrap();
        let result = scan(tmp.path(), "media");
        assert!(matches!(result, Err(ScanError::DuplicateName(name)) if name == "deep"));
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tmp = vault_dir(&[("Note.md", "x"), (".obsidian/workspace.md", "y")]);
        fs::write(tmp.path().join(".hidden.md"), "z").unwrap();

        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.pages.len(), 2); // root + Note
        assert!(vault.media.is_empty());
    }

    #[test]
    fn media_destination_sanitizes_stem_and_keeps_extension() {
        let tmp = vault_dir(&[("Note.md", "x")]);
        fs::write(tmp.path().join("My Photo.JPG"), b"bytes").unwrap();

        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.media.len(), 1);
        let entry = &vault.media[0];
        assert_eq!(entry.name, "My Photo.JPG");
        assert_eq!(entry.url, "media/my_photo.JPG");
    }

    #[test]
    fn media_are_not_navigation_children() {
        let tmp = vault_dir(&[("Recipes/Pancakes.md", "x")]);
        fs::write(tmp.path().join("Recipes/crumb.jpg"), b"img").unwrap();

        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.navigation["Recipes"].children, vec!["Pancakes"]);
    }

    #[test]
    fn navigation_forms_a_rooted_tree() {
        let tmp = vault_dir(&[
            ("Alpha.md", "x"),
            ("Recipes/Pancakes.md", "x"),
            ("Recipes/Sweets/Fudge.md", "x"),
        ]);
        let vault = scan(tmp.path(), "media").unwrap();

        assert_eq!(vault.navigation[&vault.root].parent, None);
        assert_eq!(
            vault.navigation["Recipes"].parent.as_deref(),
            Some(vault.root.as_str())
        );
        assert_eq!(
            vault.navigation["Sweets"].parent.as_deref(),
            Some("Recipes")
        );
        assert_eq!(vault.navigation["Fudge"].parent.as_deref(), Some("Sweets"));

        // Every non-root node's parent exists in the table.
        for (name, node) in &vault.navigation {
            if let Some(parent) = &node.parent {
                assert!(
                    vault.navigation.contains_key(parent),
                    "orphaned node {name}"
                );
            }
        }
    }

    #[test]
    fn children_are_in_file_name_order() {
        let tmp = vault_dir(&[("b.md", "x"), ("a.md", "x"), ("c.md", "x")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert_eq!(vault.navigation[&vault.root].children, vec!["a", "b", "c"]);
    }

    #[test]
    fn leaf_pages_have_empty_children() {
        let tmp = vault_dir(&[("Note.md", "x")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert!(vault.navigation["Note"].children.is_empty());
    }

    #[test]
    fn markup_extension_is_case_insensitive() {
        let tmp = vault_dir(&[("Note.MD", "x")]);
        let vault = scan(tmp.path(), "media").unwrap();
        assert!(vault.pages.contains_key("Note"));
        assert!(vault.media.is_empty());
    }
}
