//! CLI command implementations.

pub(crate) mod confluence;

pub(crate) use confluence::ConfluenceCommand;
