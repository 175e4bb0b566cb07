//! `rw confluence` subcommand group.

mod plan;

use clap::Subcommand;

use plan::PlanArgs;

use crate::error::CliError;

/// Confluence commands.
#[derive(Subcommand)]
pub(crate) enum ConfluenceCommand {
    /// Preview the changes a publish would make, without contacting Confluence.
    Plan(PlanArgs),
}

impl ConfluenceCommand {
    /// Whether verbose logging was requested.
    pub(crate) fn verbose(&self) -> bool {
        match self {
            Self::Plan(args) => args.verbose,
        }
    }

    /// Execute the confluence subcommand.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Plan(args) => args.execute(),
        }
    }
}
