//! CLI error types.

use cdox_anchors::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Anchors(#[from] StoreError),

    #[error("{0} broken link(s)")]
    BrokenLinks(usize),

    #[error("{0} warning(s) with --fail-on-warnings set")]
    WarningsFatal(usize),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Configuration problems exit with 2, broken links with 3, fatal
    /// warnings with 4; everything else maps to 1.
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::BrokenLinks(_) => 3,
            Self::WarningsFatal(_) => 4,
            Self::Io(_) | Self::Anchors(_) => 1,
        }
    }
}
