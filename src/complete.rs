//! Tab completion for the wizard's text inputs.
//!
//! Two sources: filesystem paths for the installer input, and known package
//! names plus a list of common applications for the name input. Both resolve
//! the same way: one candidate replaces the buffer, several extend it to their
//! longest common prefix.

use std::fs;
use std::path::{MAIN_SEPARATOR, Path};

/// Suggested package names offered even when no packages exist yet
pub const COMMON_APPS: &[&str] = &[
    "Microsoft Office",
    "Adobe Acrobat Reader",
    "Google Chrome",
    "Mozilla Firefox",
    "Zoom",
    "Microsoft Teams",
    "VLC Media Player",
    "7-Zip",
    "Notepad++",
    "Visual Studio Code",
];

/// Result of one Tab press
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Completion {
    /// New input buffer
    pub buffer: String,
    /// Every match, shown under the input when there is more than one
    pub candidates: Vec<String>,
}

impl Completion {
    fn resolve(input: &str, candidates: Vec<String>) -> Self {
        let buffer = match candidates.as_slice() {
            [] => input.to_string(),
            [only] => only.clone(),
            many => {
                let prefix = longest_common_prefix(many);
                if prefix.chars().count() > input.chars().count() {
                    prefix
                } else {
                    input.to_string()
                }
            }
        };
        Self { buffer, candidates }
    }
}

/// Complete a filesystem path.
///
/// Matching is a case-insensitive prefix test on the last path component.
/// Directories get a trailing separator so the next Tab descends into them.
pub fn complete_path(input: &str) -> Completion {
    let (dir_part, base) = match input.rfind(is_separator) {
        Some(idx) => input.split_at(idx + 1),
        None => ("", input),
    };

    if dir_part.is_empty() && base.is_empty() {
        return Completion::resolve(input, filesystem_roots());
    }

    let dir = if dir_part.is_empty() {
        Path::new(".")
    } else {
        Path::new(dir_part)
    };
    let Ok(entries) = fs::read_dir(dir) else {
        return Completion::resolve(input, Vec::new());
    };

    let base_lower = base.to_lowercase();
    let mut candidates: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.to_lowercase().starts_with(&base_lower) {
                return None;
            }
            let mut candidate = format!("{dir_part}{name}");
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                candidate.push(MAIN_SEPARATOR);
            }
            Some(candidate)
        })
        .collect();
    candidates.sort();

    Completion::resolve(input, candidates)
}

/// Complete a package name from existing packages and [`COMMON_APPS`]
pub fn complete_name(input: &str, known: &[String]) -> Completion {
    let needle = input.trim_start().to_lowercase();
    let mut candidates: Vec<String> = Vec::new();
    for name in known
        .iter()
        .map(String::as_str)
        .chain(COMMON_APPS.iter().copied())
    {
        if name.to_lowercase().starts_with(&needle) && !candidates.iter().any(|c| c == name) {
            candidates.push(name.to_string());
        }
    }
    Completion::resolve(input, candidates)
}

/// Longest prefix shared by every string, compared character by character
pub fn longest_common_prefix(items: &[String]) -> String {
    let Some((first, rest)) = items.split_first() else {
        return String::new();
    };
    let mut len = first.len();
    for item in rest {
        len = first
            .char_indices()
            .zip(item.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((idx, c), _)| idx + c.len_utf8())
            .unwrap_or(0)
            .min(len);
    }
    first[..len].to_string()
}

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

#[cfg(windows)]
fn filesystem_roots() -> Vec<String> {
    ('A'..='Z')
        .map(|drive| format!("{drive}:\\"))
        .filter(|root| Path::new(root).exists())
        .collect()
}

#[cfg(not(windows))]
fn filesystem_roots() -> Vec<String> {
    vec!["/".to_string()]
}
