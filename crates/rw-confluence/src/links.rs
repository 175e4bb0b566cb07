//! Cross-document link rewriting.
//!
//! Rendered bodies link to each other by relative path (`../guide/intro.xml`,
//! `./page.html#setup`, `/reference/index.xml`). Confluence needs absolute
//! page URLs, which only exist once a page has an ID. Pages created in the
//! same batch have no ID yet, so resolution runs in two passes:
//!
//! 1. [`resolve_links`] against pages that already exist; changes that still
//!    hold unresolved links come back in [`LinkResolution::deferred`]
//! 2. after the batch has been executed and every new ID is in the
//!    [`FileToPageTable`], [`convert_for_second_pass`] turns the deferred
//!    creates into updates and [`resolve_links`] runs again on them

use std::collections::HashMap;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::{Captures, Regex};
use tracing::{debug, info, warn};

use crate::parent::{ParentReference, page_url};
use crate::path;
use crate::types::{RemotePage, SpaceChange};

/// Pattern for double- or single-quoted `href` attributes.
static HREF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href="([^"]*)"|href='([^']*)'"#).expect("invalid href regex")
});

/// Pattern for URLs with a scheme (`https:`, `mailto:`, ...).
static SCHEME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("invalid scheme regex"));

/// Extensions of link targets that name a document rather than a resource.
const PAGE_EXTENSIONS: &[&str] = &["xml", "html", "htm", "qmd", "md"];

/// Page IDs by publisher file name.
#[derive(Debug, Clone, Default)]
pub struct FileToPageTable {
    pages: HashMap<String, String>,
    stems: HashMap<String, String>,
}

impl FileToPageTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of the managed pages in a remote snapshot.
    ///
    /// When several pages share a file name the first one is kept, matching
    /// the page reconciliation updates.
    #[must_use]
    pub fn from_pages<'a>(pages: impl IntoIterator<Item = &'a RemotePage>) -> Self {
        let mut table = Self::new();
        for page in pages {
            if let Some(file) = page.file_name()
                && table.get(file).is_none()
            {
                table.insert(file, &page.id);
            }
        }
        table
    }

    /// Record the page ID for `file_name`, replacing any previous entry.
    pub fn insert(&mut self, file_name: &str, id: &str) {
        if path::extension(file_name).is_some() {
            self.stems
                .insert(path::without_extension(file_name).to_owned(), id.to_owned());
        }
        self.pages.insert(file_name.to_owned(), id.to_owned());
    }

    /// Page ID recorded for exactly `file_name`.
    pub fn get(&self, file_name: &str) -> Option<&str> {
        self.pages.get(file_name).map(String::as_str)
    }

    /// Page ID for a link target.
    ///
    /// Tries the exact file name, then the folder page of an `index`
    /// target, then a document with the same path but another extension.
    pub fn lookup(&self, target: &str) -> Option<&str> {
        if let Some(id) = self.get(target) {
            return Some(id);
        }
        if let Some(folder) = path::index_folder(target).filter(|f| !f.is_empty())
            && let Some(id) = self.get(folder)
        {
            return Some(id);
        }
        if path::extension(target).is_none() {
            return None;
        }
        self.stems
            .get(path::without_extension(target))
            .map(String::as_str)
    }

    /// Number of recorded file names.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no file names are recorded.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Output of one link resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkResolution {
    /// Every input change, with resolvable links rewritten.
    pub resolved: Vec<SpaceChange>,
    /// Copies of the changes that still hold unresolved links.
    pub deferred: Vec<SpaceChange>,
}

/// Rewrite intra-space links in every create and update body.
///
/// Links resolve relative to the referencing document's folder. A folder
/// page (file name without extension) is its own base, since it carries
/// the folder's index content.
pub fn resolve_links(
    table: &FileToPageTable,
    changes: Vec<SpaceChange>,
    server: &str,
    parent: &ParentReference,
) -> LinkResolution {
    let mut resolution = LinkResolution::default();
    let mut rewritten = 0;

    for mut change in changes {
        let Some(base) = change.file_name().map(|f| link_base(f).to_owned()) else {
            resolution.resolved.push(change);
            continue;
        };
        let Some(body) = change.body_mut() else {
            resolution.resolved.push(change);
            continue;
        };

        let mut unresolved = 0;
        let value = HREF_PATTERN
            .replace_all(&body.storage.value, |caps: &Captures| {
                let (href, quote) = match caps.get(1) {
                    Some(m) => (m.as_str(), '"'),
                    None => (caps.get(2).map_or("", |m| m.as_str()), '\''),
                };
                match resolve_href(href, &base, table, server, parent) {
                    Href::Resolved(url) => {
                        rewritten += 1;
                        format!("href={quote}{url}{quote}")
                    }
                    Href::Unresolved => {
                        unresolved += 1;
                        caps[0].to_owned()
                    }
                    Href::Untouched => caps[0].to_owned(),
                }
            })
            .into_owned();
        body.storage.value = value;

        if unresolved > 0 {
            debug!(file = ?change.file_name(), unresolved, "Deferring change with unresolved links");
            resolution.deferred.push(change.clone());
        }
        resolution.resolved.push(change);
    }

    info!(
        rewritten,
        deferred = resolution.deferred.len(),
        "Resolved links"
    );
    resolution
}

/// Turn deferred creates into updates of the pages they created.
///
/// Creates whose file name is missing from `table` were never executed and
/// are dropped with a warning. Updates pass through unchanged.
pub fn convert_for_second_pass(
    table: &FileToPageTable,
    changes: Vec<SpaceChange>,
) -> Vec<SpaceChange> {
    changes
        .into_iter()
        .filter_map(|change| match change {
            SpaceChange::Create(create) => match table.get(&create.file_name) {
                Some(id) => Some(SpaceChange::Update(create.into_update(id))),
                None => {
                    warn!(file = %create.file_name, "Created page has no known ID, skipping second pass");
                    None
                }
            },
            other => Some(other),
        })
        .collect()
}

enum Href {
    Resolved(String),
    Unresolved,
    Untouched,
}

fn resolve_href(
    href: &str,
    base: &str,
    table: &FileToPageTable,
    server: &str,
    parent: &ParentReference,
) -> Href {
    if href.is_empty() || href.starts_with('#') || href.starts_with("//") {
        return Href::Untouched;
    }
    if SCHEME_PATTERN.is_match(href) {
        return Href::Untouched;
    }

    let (location, anchor) = match href.split_once('#') {
        Some((location, anchor)) => (location, Some(anchor)),
        None => (href, None),
    };
    let location = location.split_once('?').map_or(location, |(l, _)| l);
    let decoded = percent_decode_str(location).decode_utf8_lossy();
    let absolute = decoded.starts_with(['/', '\\']);
    let decoded = path::normalize(&decoded);

    let target = if absolute {
        path::join("", &decoded)
    } else {
        path::join(base, &decoded)
    };
    let Some(target) = target else {
        return Href::Unresolved;
    };
    if path::extension(&target).is_some_and(|ext| !PAGE_EXTENSIONS.contains(&ext)) {
        return Href::Untouched;
    }

    let id = table.lookup(&target).or_else(|| {
        (path::index_folder(&target) == Some("") || target.is_empty())
            .then_some(parent.parent.as_deref())
            .flatten()
    });
    match id {
        Some(id) => {
            let mut url = page_url(server, &parent.space, id);
            if let Some(anchor) = anchor.filter(|a| !a.is_empty()) {
                url.push('#');
                url.push_str(anchor);
            }
            Href::Resolved(url)
        }
        None => Href::Unresolved,
    }
}

/// Folder that relative links in a page resolve against.
fn link_base(file_name: &str) -> &str {
    if path::extension(file_name).is_some() {
        path::parent_folder(file_name)
    } else {
        file_name
    }
}
