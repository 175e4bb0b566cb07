//! Error types for Confluence publishing.

/// Error from a publish run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PublishError {
    /// Publish target has no space key (unparseable parent URL).
    #[error("invalid publish target: space key is empty")]
    InvalidParent,

    /// A change references a placeholder parent that was never created.
    #[error("parent page for '{0}' was not created before its children")]
    UnknownAncestor(String),

    /// The executor failed to apply a change.
    #[error("remote operation failed for {target}")]
    Executor {
        /// File name or page ID the operation targeted.
        target: String,
        /// Executor error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PublishError {
    pub(crate) fn executor<E>(target: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Executor {
            target: target.to_owned(),
            source: Box::new(source),
        }
    }
}
