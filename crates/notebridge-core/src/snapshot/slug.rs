use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// File-name-safe slug of a project name
///
/// Accents are folded to their base letter, other non-ASCII characters are
/// dropped, and runs of anything non-alphanumeric become a single `-`. The
/// result may be empty.
///
/// ```
/// use notebridge_core::snapshot::slugify_project_name;
///
/// assert_eq!(slugify_project_name("São Paulo"), "sao-paulo");
/// assert_eq!(slugify_project_name("日本語"), "");
/// ```
pub fn slugify_project_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        if !c.is_ascii() {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}
