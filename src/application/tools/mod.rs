//! Client-side generators behind the site's developer tools pages.
//!
//! Every tool is a pure function from validated input to text; nothing here
//! touches the network or the filesystem.

pub mod cron;
pub mod disk_label;
pub mod retry;
pub mod roadmap;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("invalid cron expression `{expression}`: {reason}")]
    Cron { expression: String, reason: String },
    #[error("unsupported filesystem `{0}`")]
    UnsupportedFilesystem(String),
    #[error("label `{label}` is {length} characters; {filesystem} allows at most {limit}")]
    LabelTooLong {
        label: String,
        filesystem: &'static str,
        length: usize,
        limit: usize,
    },
}

impl ToolError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

/// Single-quote `value` for POSIX shells.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '='))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
