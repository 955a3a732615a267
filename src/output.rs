//! CLI output formatting.
//!
//! Each reporting concern has a pure `format_*` function (returns lines,
//! no I/O) and a `print_*` wrapper that writes to stdout. Format functions
//! are the testable surface; the wrappers exist so callers don't repeat the
//! printing loop.
//!
//! ## Scan
//!
//! ```text
//! Found 7 pages to generate, and 3 media files to copy
//! garden
//!     Sourdough
//!     Recipes
//!         Pancakes
//!         Waffles
//! ```
//!
//! ## Generation
//!
//! One line per page as it is generated (from the generate module), one
//! line per dropped reference, and a final summary:
//!
//! ```text
//! Generating Recipes
//!     unresolved link 'Missing' in Recipes (removed)
//! Generated 7 pages, copied 3 media files (1 reference dropped)
//! ```

use crate::generate::GenerateStats;
use crate::markdown::RefKind;
use crate::scan::Vault;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format the scan summary: counts plus the navigation tree.
pub fn format_scan_summary(vault: &Vault) -> Vec<String> {
    let mut lines = vec![format!(
        "Found {} pages to generate, and {} media files to copy",
        vault.pages.len(),
        vault.media.len()
    )];
    push_tree(vault, &vault.root, 0, &mut lines);
    lines
}

fn push_tree(vault: &Vault, name: &str, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", indent(depth), name));
    if let Some(node) = vault.navigation.get(name) {
        for child in &node.children {
            push_tree(vault, child, depth + 1, lines);
        }
    }
}

pub fn print_scan_summary(vault: &Vault) {
    for line in format_scan_summary(vault) {
        println!("{line}");
    }
}

/// One diagnostic line per reference dropped under lenient resolution.
pub fn format_unresolved(page: &str, target: &str, kind: RefKind) -> String {
    format!("{}unresolved {kind} '{target}' in {page} (removed)", indent(1))
}

/// Format the end-of-run summary.
pub fn format_generate_summary(stats: &GenerateStats) -> Vec<String> {
    let mut line = format!(
        "Generated {} pages, copied {} media files",
        stats.pages, stats.media
    );
    if stats.dropped > 0 {
        let plural = if stats.dropped == 1 { "" } else { "s" };
        line.push_str(&format!(" ({} reference{plural} dropped)", stats.dropped));
    }
    vec![line]
}

pub fn print_generate_summary(stats: &GenerateStats) {
    for line in format_generate_summary(stats) {
        println!("{line}");
    }
}
