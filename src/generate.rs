//! Site generation: the full scan → resolve → render run.
//!
//! Pulls the whole pipeline together:
//!
//! ```text
//! 1. Scan      input tree        →  pages + navigation + media
//! 2. Link      pages + media     →  one flat LinkTable
//! 3. Render    each page         →  resolved HTML through the template
//! 4. Copy      media + static    →  output directory
//! ```
//!
//! Rendering is a single-threaded post-order recursion from the root page:
//! a parent's children listing needs each child's resolved title and
//! description, so children are rendered before their parent's output is
//! finalized. Along the way each page's children list is reordered (once,
//! from its front matter) and written back into the shared navigation table,
//! so navigation rows and listings agree on the order.
//!
//! A run either completes or aborts on the first fatal error — duplicate
//! names, a strict-mode unresolved reference, an unknown embed extension.
//! Partial output may exist after an abort; nothing is cleaned up.
//!
//! ## Template
//!
//! Pages go through a plain text template with `{FIELD}` placeholders:
//! `SITE_NAME`, `SITE_URL`, `PAGE_TITLE`, `PAGE_DESCRIPTION`, `NAV_HTML`,
//! `HEADER_IMG_HTML`, `CONTENT_HTML`, `CHILDREN_HTML`. The file named by
//! `template_file` is used when present, otherwise the embedded stock
//! template (`static/template.html`, compiled in).

use crate::config::SiteConfig;
use crate::links::LinkTable;
use crate::markdown::{self, RefKind, RenderError};
use crate::metadata::PageMeta;
use crate::nav;
use crate::output;
use crate::scan::{self, NavNode, Page, ScanError, Vault};
use maud::{Markup, html};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

const STOCK_TEMPLATE: &str = include_str!("../static/template.html");

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("{page}: {source}")]
    Render { page: String, source: RenderError },
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateStats {
    pub pages: usize,
    pub media: usize,
    pub dropped: usize,
}

/// Per-page summary returned up the recursion for parent listings.
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub name: String,
    pub title: String,
    /// Empty when the page declares no description.
    pub description: String,
    /// Header media name, empty when absent or dropped as unresolvable.
    pub header: String,
}

/// Run a full site generation under `config`.
pub fn generate(config: &SiteConfig) -> Result<GenerateStats, GenerateError> {
    let vault = scan::scan(Path::new(&config.input_directory), &config.media_directory)?;
    let links = LinkTable::build(&vault);
    let Vault {
        root,
        pages,
        navigation,
        media,
    } = vault;

    let template = load_template(Path::new(&config.template_file))?;

    let output_dir = Path::new(&config.output_directory);
    fs::create_dir_all(output_dir)?;

    let mut builder = SiteBuilder {
        config,
        pages,
        navigation,
        links,
        template,
        root: root.clone(),
        stats: GenerateStats::default(),
    };
    builder.render_page(&root)?;
    let mut stats = builder.stats;

    // Media bytes are copied verbatim; their names were sanitized at scan
    // time and the link table already points at the destinations.
    fs::create_dir_all(output_dir.join(&config.media_directory))?;
    for entry in &media {
        fs::copy(&entry.source, output_dir.join(&entry.url))?;
        stats.media += 1;
    }

    let static_dir = Path::new(&config.static_directory);
    if static_dir.is_dir() {
        copy_dir_recursive(static_dir, output_dir)?;
    }

    Ok(stats)
}

/// The embedded stock template, printed by `notegarden gen-template`.
pub fn stock_template() -> &'static str {
    STOCK_TEMPLATE
}

struct SiteBuilder<'a> {
    config: &'a SiteConfig,
    pages: BTreeMap<String, Page>,
    navigation: BTreeMap<String, NavNode>,
    links: LinkTable,
    template: String,
    root: String,
    stats: GenerateStats,
}

impl SiteBuilder<'_> {
    /// Render one page and, post-order, everything below it.
    fn render_page(&mut self, name: &str) -> Result<PageSummary, GenerateError> {
        let page = self
            .pages
            .get(name)
            .cloned()
            .expect("navigation names come from the page table");
        println!("Generating {name}");

        let (content_html, meta) = self.render_markup(name, &page)?;

        // Reorder once, immediately before use, and write the final order
        // back so navigation rows and listings agree.
        let actual = self
            .navigation
            .get(name)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        let children = nav::reorder_children(&actual, &meta.children);
        if let Some(node) = self.navigation.get_mut(name) {
            node.children = children.clone();
        }

        let view = nav::compose(name, &self.navigation, &self.root);
        let nav_html = nav::render_nav(&view, &self.links).into_string();

        let (header_html, header) = self.render_header(name, &meta)?;

        // Children first: the listing needs their resolved titles.
        let mut summaries = Vec::with_capacity(children.len());
        for child in &children {
            summaries.push(self.render_page(child)?);
        }
        let children_html = if summaries.is_empty() {
            String::new()
        } else {
            render_children_listing(&summaries, &self.links).into_string()
        };

        let title = meta.title.clone().unwrap_or_else(|| {
            if page.output == "index.html" {
                "home".to_string()
            } else {
                name.to_string()
            }
        });
        let description = meta.description.clone().unwrap_or_default();

        let html = fill_template(
            &self.template,
            &[
                ("SITE_NAME", self.config.site_name.as_str()),
                ("SITE_URL", self.config.site_url.as_str()),
                ("PAGE_TITLE", &title),
                ("PAGE_DESCRIPTION", &description),
                ("NAV_HTML", &nav_html),
                ("HEADER_IMG_HTML", &header_html),
                ("CONTENT_HTML", &content_html),
                ("CHILDREN_HTML", &children_html),
            ],
        );
        fs::write(
            Path::new(&self.config.output_directory).join(&page.output),
            html,
        )?;
        self.stats.pages += 1;

        Ok(PageSummary {
            name: name.to_string(),
            title,
            description,
            header,
        })
    }

    /// Parse and resolve the page's markup, reporting dropped references.
    fn render_markup(
        &mut self,
        name: &str,
        page: &Page,
    ) -> Result<(String, PageMeta), GenerateError> {
        let Some(source_path) = &page.source else {
            return Ok((String::new(), PageMeta::default()));
        };
        let source = fs::read_to_string(source_path)?;
        let rendered = markdown::render(&source, &self.links, self.config.strict)
            .map_err(|e| GenerateError::Render {
                page: name.to_string(),
                source: e,
            })?;
        for dropped in &rendered.dropped {
            println!(
                "{}",
                output::format_unresolved(name, &dropped.target, dropped.kind)
            );
        }
        self.stats.dropped += rendered.dropped.len();
        Ok((rendered.html, rendered.meta))
    }

    /// Resolve the header figure, if the page declares one. Unresolvable
    /// header names follow the same strict/lenient policy as embeds.
    fn render_header(
        &mut self,
        name: &str,
        meta: &PageMeta,
    ) -> Result<(String, String), GenerateError> {
        let Some(header) = &meta.header else {
            return Ok((String::new(), String::new()));
        };
        match self.links.resolve(header) {
            Some(src) => Ok((
                render_header_figure(src, meta.header_caption.as_deref()).into_string(),
                header.clone(),
            )),
            None if self.config.strict => Err(GenerateError::Render {
                page: name.to_string(),
                source: RenderError::Unresolved(header.clone()),
            }),
            None => {
                println!("{}", output::format_unresolved(name, header, RefKind::Image));
                self.stats.dropped += 1;
                Ok((String::new(), String::new()))
            }
        }
    }
}

/// The header image and optional caption above the page content.
fn render_header_figure(src: &str, caption: Option<&str>) -> Markup {
    html! {
        img #header-img src=(src);
        @if let Some(caption) = caption {
            figcaption { (caption) }
        }
    }
}

/// The linked-card listing of a page's children.
fn render_children_listing(children: &[PageSummary], links: &LinkTable) -> Markup {
    html! {
        section #category-listing {
            @for child in children {
                div .entry {
                    a href=(links.href(&child.name)) {
                        // An empty header name is never a table key, so one
                        // lookup covers both "no header" and "has header".
                        @if let Some(src) = links.resolve(&child.header) {
                            img src=(src);
                        }
                        div .entry-text {
                            p .entry-title { (child.title) }
                            @if !child.description.is_empty() {
                                p .entry-description { (child.description) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Replace `{KEY}` placeholders in the template.
fn fill_template(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in fields {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

fn load_template(path: &Path) -> std::io::Result<String> {
    if path.exists() {
        fs::read_to_string(path)
    } else {
        Ok(STOCK_TEMPLATE.to_string())
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{VaultDir, vault_dir};

    fn config_for(tmp: &VaultDir) -> SiteConfig {
        SiteConfig {
            site_name: "Garden".to_string(),
            site_url: "https://example.org".to_string(),
            input_directory: tmp.path().to_string_lossy().to_string(),
            output_directory: tmp.base().join("out").to_string_lossy().to_string(),
            template_file: tmp.base().join("template.html").to_string_lossy().to_string(),
            static_directory: tmp.base().join("static").to_string_lossy().to_string(),
            ..SiteConfig::default()
        }
    }

    fn read_output(config: &SiteConfig, file: &str) -> String {
        fs::read_to_string(Path::new(&config.output_directory).join(file)).unwrap()
    }

    #[test]
    fn generates_one_file_per_page() {
        let tmp = vault_dir(&[("Sourdough.md", "# Hi"), ("Recipes/Pancakes.md", "x")]);
        let config = config_for(&tmp);

        let stats = generate(&config).unwrap();

        assert_eq!(stats.pages, 4); // root, Sourdough, Recipes, Pancakes
        assert!(Path::new(&config.output_directory).join("index.html").exists());
        assert!(Path::new(&config.output_directory).join("sourdough.html").exists());
        assert!(Path::new(&config.output_directory).join("recipes.html").exists());
        assert!(Path::new(&config.output_directory).join("pancakes.html").exists());
    }

    #[test]
    fn template_fields_are_substituted() {
        let tmp = vault_dir(&[("Note.md", "body text")]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "note.html");
        assert!(html.contains("Garden"));
        assert!(html.contains("body text"));
        assert!(!html.contains("{SITE_NAME}"));
        assert!(!html.contains("{CONTENT_HTML}"));
    }

    #[test]
    fn root_title_falls_back_to_home() {
        let tmp = vault_dir(&[("Note.md", "x")]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        assert!(read_output(&config, "index.html").contains("home"));
    }

    #[test]
    fn front_matter_title_overrides_name() {
        let tmp = vault_dir(&[("Note.md", "---\ntitle: Better Title\n---\ntext")]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "note.html");
        assert!(html.contains("Better Title"));
    }

    #[test]
    fn internal_links_are_resolved_in_output() {
        let tmp = vault_dir(&[("A.md", "see [[B|the other note]]"), ("B.md", "x")]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "a.html");
        assert!(html.contains("<a href=\"b.html\">the other note</a>"));
    }

    #[test]
    fn parent_listing_uses_child_titles_and_descriptions() {
        let tmp = vault_dir(&[
            (
                "Recipes/Pancakes.md",
                "---\ntitle: Fluffy Pancakes\ndescription: Weekend breakfast.\n---\nx",
            ),
            ("Recipes/Waffles.md", "x"),
        ]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "recipes.html");
        assert!(html.contains("category-listing"));
        assert!(html.contains("Fluffy Pancakes"));
        assert!(html.contains("Weekend breakfast."));
        assert!(html.contains("href=\"pancakes.html\""));
    }

    #[test]
    fn children_order_override_applies_to_listing() {
        let tmp = vault_dir(&[
            ("Recipes/Recipes.md", "---\nchildren:\n  - Waffles\n---\nx"),
            ("Recipes/Pancakes.md", "x"),
            ("Recipes/Waffles.md", "x"),
        ]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "recipes.html");
        let waffles = html.find("href=\"waffles.html\"").unwrap();
        let pancakes = html.find("href=\"pancakes.html\"").unwrap();
        assert!(waffles < pancakes, "declared child should be listed first");
    }

    #[test]
    fn header_image_is_rendered_with_caption() {
        let tmp = vault_dir(&[(
            "Note.md",
            "---\nheader: crumb.jpg\nheader-caption: A good crumb.\n---\nx",
        )]);
        fs::write(tmp.path().join("crumb.jpg"), b"img").unwrap();
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "note.html");
        assert!(html.contains("id=\"header-img\""));
        assert!(html.contains("src=\"media/crumb.jpg\""));
        assert!(html.contains("<figcaption>A good crumb.</figcaption>"));
    }

    #[test]
    fn unresolvable_header_is_dropped_when_lenient() {
        let tmp = vault_dir(&[("Note.md", "---\nheader: ghost.jpg\n---\nx")]);
        let config = config_for(&tmp);

        let stats = generate(&config).unwrap();
        assert_eq!(stats.dropped, 1);
        assert!(!read_output(&config, "note.html").contains("header-img"));
    }

    #[test]
    fn unresolvable_header_fails_when_strict() {
        let tmp = vault_dir(&[("Note.md", "---\nheader: ghost.jpg\n---\nx")]);
        let config = SiteConfig {
            strict: true,
            ..config_for(&tmp)
        };
        assert!(matches!(
            generate(&config),
            Err(GenerateError::Render { .. })
        ));
    }

    #[test]
    fn unresolved_link_fails_the_run_when_strict() {
        let tmp = vault_dir(&[("Note.md", "[[Missing]]")]);
        let config = SiteConfig {
            strict: true,
            ..config_for(&tmp)
        };
        assert!(matches!(
            generate(&config),
            Err(GenerateError::Render { page, .. }) if page == "Note"
        ));
    }

    #[test]
    fn unresolved_link_is_counted_when_lenient() {
        let tmp = vault_dir(&[("Note.md", "[[Missing|text]]")]);
        let config = config_for(&tmp);

        let stats = generate(&config).unwrap();
        assert_eq!(stats.dropped, 1);
        let html = read_output(&config, "note.html");
        assert!(html.contains("text"));
        assert!(!html.contains("href=\"Missing\""));
    }

    #[test]
    fn media_files_are_copied_to_their_destinations() {
        let tmp = vault_dir(&[("Note.md", "![[My Photo.jpg]]")]);
        fs::write(tmp.path().join("My Photo.jpg"), b"bytes").unwrap();
        let config = config_for(&tmp);

        let stats = generate(&config).unwrap();
        assert_eq!(stats.media, 1);
        let copied = Path::new(&config.output_directory).join("media/my_photo.jpg");
        assert_eq!(fs::read(copied).unwrap(), b"bytes");
    }

    #[test]
    fn static_directory_is_copied_over_output() {
        let tmp = vault_dir(&[("Note.md", "x")]);
        let config = config_for(&tmp);
        fs::create_dir_all(&config.static_directory).unwrap();
        fs::write(
            Path::new(&config.static_directory).join("style.css"),
            "body {}",
        )
        .unwrap();

        generate(&config).unwrap();
        assert!(Path::new(&config.output_directory).join("style.css").exists());
    }

    #[test]
    fn on_disk_template_wins_over_stock() {
        let tmp = vault_dir(&[("Note.md", "hello")]);
        let config = config_for(&tmp);
        fs::write(&config.template_file, "custom: {CONTENT_HTML}").unwrap();

        generate(&config).unwrap();
        let html = read_output(&config, "note.html");
        assert!(html.starts_with("custom:"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn navigation_fragment_appears_on_nested_pages() {
        let tmp = vault_dir(&[
            ("Recipes/Pancakes.md", "x"),
            ("Recipes/Waffles.md", "x"),
            ("About.md", "x"),
        ]);
        let config = config_for(&tmp);
        generate(&config).unwrap();

        let html = read_output(&config, "pancakes.html");
        assert!(html.contains("id=\"navtree\""));
        // Sibling row with the current page marked active.
        assert!(html.contains("class=\"active\""));
        assert!(html.contains("href=\"waffles.html\""));
        // Ancestor row listing the top level.
        assert!(html.contains("href=\"about.html\""));
    }

    #[test]
    fn duplicate_names_abort_before_any_output() {
        let tmp = vault_dir(&[("A/Same.md", "x"), ("B/Same.md", "y")]);
        let config = config_for(&tmp);
        assert!(matches!(
            generate(&config),
            Err(GenerateError::Scan(ScanError::DuplicateName(_)))
        ));
    }
}
