//! Attachment references inside storage-format bodies.
//!
//! Rendered documents reference images and other media through
//! `<ri:attachment ri:filename="..." />`. Confluence stores attachments flat
//! per page, so the publisher uploads the referenced files and rewrites every
//! reference to its basename.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::path;

/// Pattern for attachment filenames with a media extension.
static MEDIA_REFERENCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)ri:filename="([^"]+\.(?:png|jpe?g|gif|svg|webp|bmp|tiff?|pdf|mp4|webm))""#)
        .expect("invalid media reference regex")
});

/// Attachment files referenced by `body`, de-duplicated in first-seen order.
///
/// Without `known_files` the references are returned as written. Otherwise
/// each reference resolves to a sibling of `document_path` when one is
/// published, then to the suffix match closest to the document's folder,
/// and falls back to the reference itself.
pub fn find_attachments(body: &str, known_files: &[String], document_path: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let references: Vec<String> = MEDIA_REFERENCE_PATTERN
        .captures_iter(body)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()))
        .filter(|reference| !is_external(reference))
        .map(|reference| path::normalize(reference).into_owned())
        .filter(|reference| seen.insert(reference.clone()))
        .collect();

    if known_files.is_empty() {
        return references;
    }

    let folder = path::parent_folder(document_path);
    let mut resolved_seen = HashSet::new();
    references
        .into_iter()
        .map(|reference| resolve_reference(&reference, known_files, folder))
        .filter(|file| resolved_seen.insert(file.clone()))
        .collect()
}

/// Rewrite every media attachment reference in `body` to its basename.
///
/// Covers the same references [`find_attachments`] collects; other
/// `ri:filename` values are left as written.
pub fn update_image_paths(body: &str) -> String {
    MEDIA_REFERENCE_PATTERN
        .replace_all(body, |caps: &Captures| {
            let value = &caps[1];
            if is_external(value) {
                return caps[0].to_owned();
            }
            let normalized = path::normalize(value);
            format!(r#"ri:filename="{}""#, path::file_name(&normalized))
        })
        .into_owned()
}

fn resolve_reference(reference: &str, known_files: &[String], folder: &str) -> String {
    if let Some(sibling) = path::join(folder, reference)
        && known_files.contains(&sibling)
    {
        return sibling;
    }

    let suffix = format!("/{}", reference.trim_start_matches("./"));
    let bare = reference.trim_start_matches("./");
    let candidates = known_files
        .iter()
        .filter(|file| file.as_str() == bare || file.ends_with(&suffix));

    // Nearest folder wins; `max_by_key` keeps the last maximum, so iterate in reverse
    // to keep the first candidate on ties.
    let nearest = candidates
        .rev()
        .max_by_key(|file| shared_prefix_segments(path::parent_folder(file), folder));

    match nearest {
        Some(file) => file.clone(),
        None => {
            tracing::debug!(reference, "Attachment not among published files");
            reference.to_owned()
        }
    }
}

fn shared_prefix_segments(a: &str, b: &str) -> usize {
    a.split('/')
        .zip(b.split('/'))
        .take_while(|(x, y)| !x.is_empty() && x == y)
        .count()
}

fn is_external(reference: &str) -> bool {
    reference.contains("://") || reference.starts_with("data:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn test_find_attachments_dedup_in_order() {
        let body = r#"<ac:image><ri:attachment ri:filename="b.png" /></ac:image>
            <ac:image><ri:attachment ri:filename="a.jpg" /></ac:image>
            <ac:image><ri:attachment ri:filename="b.png" /></ac:image>"#;
        assert_eq!(find_attachments(body, &[], "doc.xml"), vec!["b.png", "a.jpg"]);
    }

    #[test]
    fn test_find_attachments_ignores_non_media() {
        let body = r#"<ri:attachment ri:filename="notes.txt" /><ri:attachment ri:filename="x.SVG" />"#;
        assert_eq!(find_attachments(body, &[], "doc.xml"), vec!["x.SVG"]);
    }

    #[test]
    fn test_find_attachments_ignores_external() {
        let body = r#"<ri:attachment ri:filename="https://cdn.example.com/a.png" />"#;
        assert!(find_attachments(body, &[], "doc.xml").is_empty());
    }

    #[test]
    fn test_find_attachments_prefers_sibling() {
        let body = r#"<ri:attachment ri:filename="images/chart.png" />"#;
        let known = files(&["other/images/chart.png", "guide/images/chart.png"]);
        assert_eq!(
            find_attachments(body, &known, "guide/intro.xml"),
            vec!["guide/images/chart.png"]
        );
    }

    #[test]
    fn test_find_attachments_nearest_suffix_match() {
        let body = r#"<ri:attachment ri:filename="chart.png" />"#;
        let known = files(&["z/chart.png", "guide/deep/chart.png", "guide/more/chart.png"]);
        assert_eq!(
            find_attachments(body, &known, "guide/intro/page.xml"),
            vec!["guide/deep/chart.png"]
        );
    }

    #[test]
    fn test_find_attachments_first_match_on_tie() {
        let body = r#"<ri:attachment ri:filename="chart.png" />"#;
        let known = files(&["x/chart.png", "y/chart.png"]);
        assert_eq!(find_attachments(body, &known, "doc.xml"), vec!["x/chart.png"]);
    }

    #[test]
    fn test_find_attachments_unresolved_falls_back() {
        let body = r#"<ri:attachment ri:filename="missing.png" />"#;
        let known = files(&["x/chart.png"]);
        assert_eq!(find_attachments(body, &known, "doc.xml"), vec!["missing.png"]);
    }

    #[test]
    fn test_update_image_paths_flattens() {
        let body = r#"<ri:attachment ri:filename="images/sub/chart.png" /><ri:attachment ri:filename="images\win.png" />"#;
        assert_eq!(
            update_image_paths(body),
            r#"<ri:attachment ri:filename="chart.png" /><ri:attachment ri:filename="win.png" />"#
        );
    }

    #[test]
    fn test_update_image_paths_skips_non_media() {
        let body = r#"<ri:attachment ri:filename="data/table.csv" /><ri:attachment ri:filename="img/a.png" />"#;
        assert_eq!(
            update_image_paths(body),
            r#"<ri:attachment ri:filename="data/table.csv" /><ri:attachment ri:filename="a.png" />"#
        );
        assert_eq!(find_attachments(body, &[], "doc.xml"), vec!["img/a.png"]);
    }

    #[test]
    fn test_find_attachments_normalizes_dot_prefix() {
        let body = r#"<ri:attachment ri:filename="./images/chart.png" />"#;
        let known = files(&["guide/images/chart.png"]);
        assert_eq!(
            find_attachments(body, &known, "guide/intro.xml"),
            vec!["guide/images/chart.png"]
        );
    }

    #[test]
    fn test_update_image_paths_idempotent() {
        let bodies = [
            r#"<ri:attachment ri:filename="a/b/c.png" /> text"#,
            r#"<ri:attachment ri:filename="plain.png" />"#,
            r#"<ri:attachment ri:filename="https://cdn.example.com/a/b.png" />"#,
            "no attachments here",
            "",
        ];
        for body in bodies {
            let once = update_image_paths(body);
            assert_eq!(update_image_paths(&once), once, "body: {body}");
        }
    }
}
