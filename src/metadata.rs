//! Page metadata parsed from YAML front matter.
//!
//! Notes may open with a YAML metadata block:
//!
//! ```text
//! ---
//! title: Sourdough
//! description: Everything I know about starters.
//! header: crumb.jpg
//! header-caption: A good crumb.
//! children:
//!   - Starters
//!   - Baking Day
//! ---
//! ```
//!
//! All keys are optional. Unknown keys are ignored rather than rejected —
//! Obsidian vaults carry arbitrary properties (tags, aliases, dates) that are
//! none of our business. Metadata is ephemeral: re-parsed every time a page
//! is rendered, never persisted.

use serde::Deserialize;

/// Metadata recognized from a note's front matter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PageMeta {
    /// Page title, overriding the name-derived default.
    pub title: Option<String>,
    /// Short description shown in parent listings and the page template.
    pub description: Option<String>,
    /// Media name of a header image, resolved through the link table.
    pub header: Option<String>,
    /// Caption rendered under the header image.
    pub header_caption: Option<String>,
    /// Explicit ordering for this page's children in navigation and listings.
    pub children: Vec<String>,
}

/// Parse a front-matter block's YAML body into [`PageMeta`].
///
/// An empty or whitespace-only block yields the default (all-absent) meta.
pub fn parse(yaml: &str) -> Result<PageMeta, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(PageMeta::default());
    }
    serde_yaml::from_str(yaml)
}
