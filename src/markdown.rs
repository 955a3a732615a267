//! Markdown rendering with wiki-style link and embed resolution.
//!
//! Notes are parsed with pulldown-cmark (tables, wikilinks, and YAML
//! metadata blocks enabled). Between parsing and HTML output sits the
//! resolver: a single pass over the event stream that rewrites every anchor
//! and image against the [`LinkTable`].
//!
//! ## Reference syntax
//!
//! - `[[Target]]` / `[[Target|Shown Text]]` — internal link to a page or
//!   media name.
//! - `![[crumb.jpg]]` — media embed; the extension picks the element:
//!   `jpg jpeg png gif bmp` become `<img>`, `mp4` becomes
//!   `<video controls><source>`. Anything else (or no extension at all) is
//!   [`RenderError::UnknownEmbedType`], fatal regardless of strictness.
//! - Plain Markdown links and images flow through the same resolution;
//!   the extension gate and video conversion apply only to embeds.
//!
//! ## Resolution policy
//!
//! Targets carrying an absolute-URL scheme are left alone, except that
//! anchors are tagged `class="outgoing"`. Everything else is looked up in
//! the table by exact string key. Hits get their `href`/`src` rewritten to
//! the final output path. Misses depend on the strictness flag threaded in
//! by the caller:
//!
//! - strict: the whole run aborts with [`RenderError::Unresolved`].
//! - lenient: the reference is recorded as dropped and removed — links keep
//!   their display text as plain content, embeds vanish entirely.
//!
//! The pass builds a fresh event sequence rather than mutating in place, so
//! removals never fight the iteration. Dropped references come back to the
//! caller in [`RenderedPage::dropped`]; reporting is the caller's decision.

use crate::links::LinkTable;
use crate::metadata::{self, PageMeta};
use maud::{PreEscaped, html};
use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, html as md_html};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Extensions recognized as image embeds.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp"];
/// The single recognized video embed extension.
pub const VIDEO_EXTENSION: &str = "mp4";
const VIDEO_MIME_TYPE: &str = "video/mp4";

/// Schemes that mark a reference as pointing outside the site.
const URL_SCHEMES: &[&str] = &["http://", "https://"];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("'{0}' has no extension or an unrecognized one; cannot embed")]
    UnknownEmbedType(String),
    #[error("'{0}' cannot be resolved as an output file")]
    Unresolved(String),
    #[error("front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
}

/// What kind of reference was dropped, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Link,
    Image,
    Video,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Link => write!(f, "link"),
            RefKind::Image => write!(f, "image"),
            RefKind::Video => write!(f, "video"),
        }
    }
}

/// A reference removed under lenient resolution.
#[derive(Debug, Clone)]
pub struct Unresolved {
    pub target: String,
    pub kind: RefKind,
}

/// Result of rendering one note.
#[derive(Debug)]
pub struct RenderedPage {
    /// Resolved HTML body.
    pub html: String,
    /// Front-matter metadata (default when the note has none).
    pub meta: PageMeta,
    /// References dropped under lenient resolution, in document order.
    pub dropped: Vec<Unresolved>,
}

/// Parse a note, resolve every internal reference, and render HTML.
pub fn render(source: &str, links: &LinkTable, strict: bool) -> Result<RenderedPage, RenderError> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_WIKILINKS);
    options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

    let events: Vec<Event> = Parser::new_ext(source, options).collect();
    let (meta, body) = split_front_matter(&events)?;

    let mut dropped = Vec::new();
    let resolved = resolve_events(&body, links, strict, &mut dropped)?;

    let mut html = String::new();
    md_html::push_html(&mut html, resolved.into_iter());

    Ok(RenderedPage {
        html,
        meta,
        dropped,
    })
}

/// Peel the YAML metadata block (if any) off the event stream.
fn split_front_matter<'a>(
    events: &[Event<'a>],
) -> Result<(PageMeta, Vec<Event<'a>>), RenderError> {
    let mut meta = PageMeta::default();
    let mut body = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        if matches!(events[i], Event::Start(Tag::MetadataBlock(_))) {
            let mut yaml = String::new();
            i += 1;
            while i < events.len() && !matches!(events[i], Event::End(TagEnd::MetadataBlock(_))) {
                if let Event::Text(text) = &events[i] {
                    yaml.push_str(text);
                }
                i += 1;
            }
            meta = metadata::parse(&yaml)?;
        } else {
            body.push(events[i].clone());
        }
        i += 1;
    }
    Ok((meta, body))
}

/// One pass over the event stream, producing a new stream with every anchor
/// and image resolved, tagged, or removed.
fn resolve_events<'a>(
    events: &[Event<'a>],
    links: &LinkTable,
    strict: bool,
    dropped: &mut Vec<Unresolved>,
) -> Result<Vec<Event<'a>>, RenderError> {
    let mut out = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        match &events[i] {
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let end = matching_link_end(events, i);
                let inner = &events[i + 1..end];
                let target = dest_url.trim();

                if is_outgoing(target) {
                    // Keep the link, add the outgoing marker. The anchor has
                    // to carry a class, which the plain event model cannot
                    // express, so it is rendered to raw HTML here — inner
                    // content first, since it may hold embeds of its own.
                    let inner_events = resolve_events(inner, links, strict, dropped)?;
                    let mut inner_html = String::new();
                    md_html::push_html(&mut inner_html, inner_events.into_iter());
                    let anchor = html! {
                        a.outgoing href=(target) { (PreEscaped(inner_html)) }
                    };
                    out.push(Event::InlineHtml(anchor.into_string().into()));
                } else if let Some(path) = links.resolve(target) {
                    out.push(Event::Start(Tag::Link {
                        link_type: *link_type,
                        dest_url: CowStr::from(path.to_string()),
                        title: title.clone(),
                        id: id.clone(),
                    }));
                    out.extend(resolve_events(inner, links, strict, dropped)?);
                    out.push(Event::End(TagEnd::Link));
                } else if strict {
                    return Err(RenderError::Unresolved(target.to_string()));
                } else {
                    // Drop the wrapper, keep the text.
                    dropped.push(Unresolved {
                        target: target.to_string(),
                        kind: RefKind::Link,
                    });
                    out.extend(resolve_events(inner, links, strict, dropped)?);
                }
                i = end;
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let end = matching_image_end(events, i);
                let inner = &events[i + 1..end];
                let target = dest_url.trim();

                // The extension gate applies to embeds only, and before the
                // scheme check: an embed of an unembeddable type is a typo
                // whether or not it points at a URL.
                let is_embed = matches!(link_type, LinkType::WikiLink { .. });
                let is_video = is_embed && is_video_embed(target)?;

                if is_video {
                    match video_source(target, links, strict)? {
                        Some(src) => {
                            let video = html! {
                                video controls {
                                    source src=(src) type=(VIDEO_MIME_TYPE);
                                }
                            };
                            out.push(Event::InlineHtml(video.into_string().into()));
                        }
                        None => dropped.push(Unresolved {
                            target: target.to_string(),
                            kind: RefKind::Video,
                        }),
                    }
                } else if is_outgoing(target) {
                    out.push(events[i].clone());
                    out.extend(inner.iter().cloned());
                    out.push(Event::End(TagEnd::Image));
                } else {
                    match links.resolve(target) {
                        Some(path) => {
                            out.push(Event::Start(Tag::Image {
                                link_type: *link_type,
                                dest_url: CowStr::from(path.to_string()),
                                title: title.clone(),
                                id: id.clone(),
                            }));
                            out.extend(inner.iter().cloned());
                            out.push(Event::End(TagEnd::Image));
                        }
                        None if strict => return Err(RenderError::Unresolved(target.to_string())),
                        None => dropped.push(Unresolved {
                            target: target.to_string(),
                            kind: RefKind::Image,
                        }),
                    }
                }
                i = end;
            }
            event => out.push(event.clone()),
        }
        i += 1;
    }
    Ok(out)
}

/// Classify an embed target by extension: `Ok(true)` for the video
/// extension, `Ok(false)` for an image one, an error for anything else.
fn is_video_embed(target: &str) -> Result<bool, RenderError> {
    let extension = Path::new(target)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| RenderError::UnknownEmbedType(target.to_string()))?;

    if extension.eq_ignore_ascii_case(VIDEO_EXTENSION) {
        Ok(true)
    } else if IMAGE_EXTENSIONS
        .iter()
        .any(|e| extension.eq_ignore_ascii_case(e))
    {
        Ok(false)
    } else {
        Err(RenderError::UnknownEmbedType(target.to_string()))
    }
}

fn is_outgoing(target: &str) -> bool {
    URL_SCHEMES.iter().any(|scheme| target.starts_with(scheme))
}

/// Final `src` for a video embed: the target itself when absolute, the
/// table's path when resolvable, `None` when dropped under lenient mode.
fn video_source<'a>(
    target: &'a str,
    links: &'a LinkTable,
    strict: bool,
) -> Result<Option<&'a str>, RenderError> {
    if is_outgoing(target) {
        return Ok(Some(target));
    }
    match links.resolve(target) {
        Some(path) => Ok(Some(path)),
        None if strict => Err(RenderError::Unresolved(target.to_string())),
        None => Ok(None),
    }
}

/// Index of the `End` event closing the link opened at `start`.
fn matching_link_end(events: &[Event], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, event) in events[start..].iter().enumerate() {
        match event {
            Event::Start(Tag::Link { .. }) => depth += 1,
            Event::End(TagEnd::Link) => {
                depth -= 1;
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len()
}

/// Index of the `End` event closing the image opened at `start`.
fn matching_image_end(events: &[Event], start: usize) -> usize {
    let mut depth = 0usize;
    for (offset, event) in events[start..].iter().enumerate() {
        match event {
            Event::Start(Tag::Image { .. }) => depth += 1,
            Event::End(TagEnd::Image) => {
                depth -= 1;
                if depth == 0 {
                    return start + offset;
                }
            }
            _ => {}
        }
    }
    events.len()
}
