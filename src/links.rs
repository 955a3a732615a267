//! The link table: one flat name → output-path mapping.
//!
//! Internal references never mention output paths — a note writes
//! `[[Pancakes]]` or `![[crumb.jpg]]` and the table says where those names
//! ended up. Page names map to their page output paths; media names (full
//! file name, extension included) map to their media destinations. Built once
//! per run after scanning, read-only from then on.

use crate::scan::Vault;
use std::collections::BTreeMap;

/// Global name → output-path table. The single source of truth the resolver
/// queries; lookups are by exact string key, no fuzzy fallback.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    entries: BTreeMap<String, String>,
}

impl LinkTable {
    /// Merge page and media output paths into one table.
    ///
    /// Pages first, then media: page names are globally unique by the time a
    /// scan succeeds, and media names carry their extension, so the two sets
    /// do not collide in practice.
    pub fn build(vault: &Vault) -> Self {
        let mut entries = BTreeMap::new();
        for (name, page) in &vault.pages {
            entries.insert(name.clone(), page.output.clone());
        }
        for media in &vault.media {
            entries.insert(media.name.clone(), media.url.clone());
        }
        Self { entries }
    }

    /// Look up a logical name's output path.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Output path for a name known to be a page, e.g. when rendering
    /// navigation rows built from the navigation table itself. Falls back to
    /// an empty href rather than panicking if the invariant is ever broken.
    pub fn href(&self, name: &str) -> &str {
        self.resolve(name).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::test_helpers::vault_dir;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn pages_and_media_share_one_table() {
        let tmp = vault_dir(&[("Sourdough.md", "x"), ("Recipes/Pancakes.md", "x")]);
        fs::write(tmp.path().join("crumb.jpg"), b"img").unwrap();

        let vault = scan(tmp.path(), "media").unwrap();
        let links = LinkTable::build(&vault);

        assert_eq!(links.resolve("Sourdough"), Some("sourdough.html"));
        assert_eq!(links.resolve("Pancakes"), Some("pancakes.html"));
        assert_eq!(links.resolve("Recipes"), Some("recipes.html"));
        assert_eq!(links.resolve("crumb.jpg"), Some("media/crumb.jpg"));
        assert_eq!(links.resolve(&vault.root), Some("index.html"));
    }

    #[test]
    fn lookup_is_exact_match_only() {
        let links = LinkTable::from_pairs(&[("Alpha", "alpha.html")]);
        assert_eq!(links.resolve("Alpha"), Some("alpha.html"));
        assert_eq!(links.resolve("alpha"), None);
        assert_eq!(links.resolve("Alph"), None);
    }

    #[test]
    fn href_is_empty_for_unknown_names() {
        let links = LinkTable::from_pairs(&[]);
        assert_eq!(links.href("ghost"), "");
    }
}
