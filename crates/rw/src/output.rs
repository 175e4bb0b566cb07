//! Plan rendering for the terminal.
//!
//! Human-readable lines go to stderr so `--json` output on stdout stays
//! machine-readable.

use console::{Style, Term};
use rw_confluence::RecordedOperation;

/// Coloring applied to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    /// Page creation.
    Added,
    /// Deletions and unresolved links.
    Caution,
    /// Dry-run banner.
    Banner,
    Failure,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Added => Style::new().green(),
            Self::Caution => Style::new().yellow(),
            Self::Banner => Style::new().cyan().bold(),
            Self::Failure => Style::new().red(),
        }
    }
}

/// Stderr for people, stdout for JSON.
pub(crate) struct Console {
    stderr: Term,
    stdout: Term,
}

impl Console {
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            stdout: Term::stdout(),
        }
    }

    /// Write one line in the given tone.
    pub(crate) fn line(&self, tone: Tone, msg: &str) {
        let _ = self
            .stderr
            .write_line(&tone.style().apply_to(msg).to_string());
    }

    pub(crate) fn operation(&self, operation: &RecordedOperation) {
        let (tone, line) = describe_operation(operation);
        self.line(tone, &line);
    }

    pub(crate) fn rule(&self) {
        let _ = self.stderr.write_line(&"=".repeat(70));
    }

    pub(crate) fn json(&self, text: &str) {
        let _ = self.stdout.write_line(text);
    }
}

/// One plan line per recorded operation.
pub(crate) fn describe_operation(operation: &RecordedOperation) -> (Tone, String) {
    match operation {
        RecordedOperation::Create { id, change } => (
            Tone::Added,
            format!(
                r#"  + create "{}" ({}) as {id}"#,
                change.title, change.file_name
            ),
        ),
        RecordedOperation::Update { version, change } => (
            Tone::Plain,
            format!(
                r#"  ~ update "{}" ({}) page {} -> v{version}"#,
                change.title, change.file_name, change.id
            ),
        ),
        RecordedOperation::Delete { id } => (Tone::Caution, format!("  - delete page {id}")),
        RecordedOperation::Upload { page_id, file } => (
            Tone::Plain,
            format!("      attach {file} to page {page_id}"),
        ),
    }
}
