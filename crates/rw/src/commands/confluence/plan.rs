//! `rw confluence plan` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use rw_config::{CliSettings, Config, ConfluenceConfig};
use rw_confluence::{
    DryRunExecutor, LocalDocument, ParentReference, PublishConfig, PublishRequest, PublishResult,
    RecordedOperation, RemotePage, SpacePublisher, normalize_server_url, server_from_url,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CliError;
use crate::output::{Console, Tone};

/// Manifest read from the source directory when `--documents` is omitted.
const DOCUMENTS_MANIFEST: &str = "documents.json";

/// Arguments for the confluence plan command.
#[derive(Args)]
pub(crate) struct PlanArgs {
    /// JSON array of rendered documents (default: `<source_dir>/documents.json`).
    #[arg(long)]
    documents: Option<PathBuf>,

    /// JSON array of pages currently under the parent page.
    #[arg(long)]
    pages: Option<PathBuf>,

    /// JSON array of published resource files that attachments resolve against.
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Parent page or space overview URL (overrides config).
    #[arg(long)]
    parent_url: Option<String>,

    /// Rendered documents directory (overrides config).
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Print operations and result as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Path to configuration file (default: auto-discover rw.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Machine-readable plan output.
#[derive(Serialize)]
struct PlanReport<'a> {
    operations: &'a [RecordedOperation],
    result: &'a PublishResult,
}

impl PlanArgs {
    /// Execute the plan command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, inputs or the publish run are invalid.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let console = Console::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            parent_url: self.parent_url.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let publish_config = publish_config(config.require_confluence()?)?;

        let documents_path = self
            .documents
            .clone()
            .unwrap_or_else(|| config.docs_resolved.source_dir.join(DOCUMENTS_MANIFEST));
        let documents: Vec<LocalDocument> = read_json(&documents_path)?;
        let pages: Vec<RemotePage> = read_optional_json(self.pages.as_deref())?;
        let resources: Vec<String> = read_optional_json(self.resources.as_deref())?;
        tracing::debug!(
            documents = %documents_path.display(),
            server = %publish_config.server,
            "Loaded plan inputs"
        );

        if !self.json {
            console.line(
                Tone::Plain,
                &format!(
                    "Planning {} document(s) against {} existing page(s) in space {}...",
                    documents.len(),
                    pages.len(),
                    publish_config.parent.space
                ),
            );
        }

        let mut executor = DryRunExecutor::new();
        let request = PublishRequest::new(&documents)
            .existing(&pages)
            .resources(&resources);
        let result = SpacePublisher::new(&mut executor, publish_config).publish(&request)?;

        if self.json {
            let report = PlanReport {
                operations: executor.operations(),
                result: &result,
            };
            console.json(&serde_json::to_string_pretty(&report)?);
        } else {
            print_plan(&console, executor.operations(), &result);
        }

        Ok(())
    }
}

/// Build the publish target from validated Confluence settings.
fn publish_config(confluence: &ConfluenceConfig) -> Result<PublishConfig, CliError> {
    let parent = ParentReference::from_url(&confluence.parent_url);
    if !parent.is_valid() {
        return Err(CliError::Validation(format!(
            "cannot determine space from parent URL: {}",
            confluence.parent_url
        )));
    }
    let server = confluence
        .base_url
        .as_deref()
        .map(normalize_server_url)
        .or_else(|| server_from_url(&confluence.parent_url))
        .ok_or_else(|| {
            CliError::Validation(format!(
                "cannot determine server from parent URL: {}",
                confluence.parent_url
            ))
        })?;
    Ok(PublishConfig { server, parent })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Validation(format!("cannot read {}: {e}", path.display()))
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn read_optional_json<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, CliError> {
    path.map_or_else(|| Ok(T::default()), read_json)
}

fn print_plan(console: &Console, operations: &[RecordedOperation], result: &PublishResult) {
    console.line(Tone::Banner, "\n[DRY RUN] No changes made.");

    if operations.is_empty() {
        console.line(Tone::Added, "\nNothing to do.");
        return;
    }

    console.line(Tone::Plain, "");
    for operation in operations {
        console.operation(operation);
    }

    console.rule();
    console.line(
        Tone::Plain,
        &format!(
            "Created: {}  Updated: {}  Deleted: {}  Relinked: {}  Attachments: {}",
            result.created.len(),
            result.updated.len(),
            result.deleted.len(),
            result.relinked,
            result.attachments_uploaded
        ),
    );

    if !result.unresolved.is_empty() {
        console.line(
            Tone::Caution,
            &format!(
                "\nWarning: {} page(s) still link to documents that are not published:",
                result.unresolved.len()
            ),
        );
        for file in &result.unresolved {
            console.line(Tone::Plain, &format!("  - {file}"));
        }
    }
}
