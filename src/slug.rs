//! Centralized name sanitization for output paths.
//!
//! Page names and media file stems come straight from the filesystem and can
//! contain anything a user's OS allows — spaces, punctuation, uppercase,
//! non-ASCII. Output paths must be URL-safe, so every name passes through
//! [`sanitize`] exactly once on its way into an output path.
//!
//! The mapping is deliberately lossy: `"My Note!"` and `"My Note?"` both
//! become `my_note_`. Collisions between *names* are caught earlier by the
//! scanner's duplicate check; collisions between sanitized output paths of
//! distinct names are accepted the same way the duplicate check defines
//! identity (by name, not by slug).

/// Characters that survive sanitization unchanged.
const CHAR_WHITELIST: &str = "abcdefghijklmnopqrstuvwxyz0123456789-_";

/// Map an arbitrary title or filename stem to a URL-safe slug.
///
/// Lower-cases the input and replaces every character outside `[a-z0-9-_]`
/// with an underscore. Total (never fails) and idempotent:
///
/// - `"My Note!"` → `"my_note_"`
/// - `"Recipes"` → `"recipes"`
/// - `"already_safe-1"` → `"already_safe-1"`
pub fn sanitize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if CHAR_WHITELIST.contains(c) { c } else { '_' })
        .collect()
}
