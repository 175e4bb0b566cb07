//! File path normalization for published documents.
//!
//! Every path that enters the crate (local document paths, remote
//! `fileName` metadata, references found in bodies) goes through
//! [`normalize`] once, at the point it is constructed or deserialized.
//! Everything downstream compares plain `/`-separated strings.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};

/// File stem that marks a folder's landing document.
pub const INDEX_STEM: &str = "index";

/// Extension of rendered documents.
pub const DOCUMENT_EXTENSION: &str = "xml";

/// Convert `\` separators to `/` and drop empty and `.` segments.
///
/// Paths are relative to the site root, so a leading `/` is dropped too.
/// `..` segments are kept; [`join`] resolves them.
pub fn normalize(path: &str) -> Cow<'_, str> {
    let clean = !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != ".");
    if clean {
        return Cow::Borrowed(path);
    }
    let segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    Cow::Owned(segments.join("/"))
}

/// Ancestor folder paths of `path`, root-most first, excluding the file itself.
///
/// `"a/b/c.xml"` yields `["a", "a/b"]`. Empty segments are skipped.
pub fn parent_chain(path: &str) -> Vec<String> {
    let normalized = normalize(path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let Some((_, folders)) = segments.split_last() else {
        return Vec::new();
    };

    let mut chain = Vec::with_capacity(folders.len());
    let mut current = String::new();
    for folder in folders {
        if !current.is_empty() {
            current.push('/');
        }
        current.push_str(folder);
        chain.push(current.clone());
    }
    chain
}

/// Folder containing `path`, or `""` at the root.
pub fn parent_folder(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(folder, _)| folder)
}

/// Last segment of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Last segment of `path` without its extension.
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Extension of the last segment, if any.
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext),
        _ => None,
    }
}

/// `path` without the extension of its last segment.
pub fn without_extension(path: &str) -> &str {
    match extension(path) {
        Some(ext) => &path[..path.len() - ext.len() - 1],
        None => path,
    }
}

/// Whether `path` names a folder landing document (`index.*`).
pub fn is_index(path: &str) -> bool {
    extension(path).is_some() && file_stem(path) == INDEX_STEM
}

/// Folder represented by an index document.
///
/// Returns `None` for non-index paths and `Some("")` for the root `index.xml`.
pub fn index_folder(path: &str) -> Option<&str> {
    is_index(path).then(|| parent_folder(path))
}

/// Join `relative` onto `folder`, resolving `.` and `..` segments.
///
/// Returns `None` when `..` would climb above the root.
pub fn join(folder: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

/// Uppercase the first character of `text`.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Serde helper normalizing a path field on the way in.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize(&raw).into_owned())
}

/// Serde helper normalizing an optional path field on the way in.
pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|p| normalize(&p).into_owned()))
}
