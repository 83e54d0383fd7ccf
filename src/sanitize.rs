//! Package name normalization
//!
//! Package directories are named after a filesystem-safe form of the name the
//! operator typed. The store converts those directory names back into labels
//! for menus.

/// Convert a free-text package name into a directory-safe name.
///
/// - Lowercases the input and turns whitespace and underscores into hyphens
/// - Drops every character outside `[a-z0-9-]`
/// - Collapses runs of hyphens and trims them from both ends
///
/// The result may be empty (e.g. `"***"`); callers must reject that before
/// using it as a path component.
pub fn sanitize_package_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_was_hyphen = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        let mapped = if ch.is_whitespace() || ch == '_' { '-' } else { ch };

        if mapped == '-' {
            if !last_was_hyphen && !result.is_empty() {
                result.push('-');
                last_was_hyphen = true;
            }
        } else if mapped.is_ascii_lowercase() || mapped.is_ascii_digit() {
            result.push(mapped);
            last_was_hyphen = false;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Turn a sanitized directory name back into a display label.
///
/// Hyphens become spaces and each word is title-cased:
/// `"microsoft-office"` becomes `"Microsoft Office"`.
pub fn display_name(dir_name: &str) -> String {
    dir_name
        .split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
