use std::error::Error as StdError;

use serde::Serialize;
use thiserror::Error;

use crate::{
    application::{
        listing::ListError, loader::LoadError, repos::ApiError, tools::ToolError,
    },
    config::LoadError as ConfigError,
    domain::{error::DomainError, slug::SlugError},
    infra::error::InfraError,
};

/// The flat error states a list page can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerKind {
    FetchFailed,
    ActionFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn fetch_failed(collection: &str) -> Self {
        Self {
            kind: BannerKind::FetchFailed,
            message: format!("Failed to load {collection}. Please try again."),
        }
    }

    pub fn action_failed(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::ActionFailed,
            message: message.into(),
        }
    }
}

/// `error` followed by each of its sources.
pub fn error_chain(error: &dyn StdError) -> Vec<String> {
    let mut messages = vec![error.to_string()];
    let mut current = error.source();
    while let Some(inner) = current {
        messages.push(inner.to_string());
        current = inner.source();
    }
    messages
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    List(#[from] ListError),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Process exit code for the operator CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Domain(_)
            | AppError::Validation(_)
            | AppError::Slug(_)
            | AppError::Tool(_)
            | AppError::Config(_) => 2,
            AppError::List(ListError::Load(_) | ListError::Bulk(_) | ListError::Action { .. }) => 3,
            AppError::List(_) => 2,
            AppError::Api(_) | AppError::Load(_) => 3,
            AppError::Infra(_) | AppError::Unexpected(_) => 1,
        }
    }

    pub fn presentation_message(&self) -> &'static str {
        match self {
            AppError::Domain(_) | AppError::Validation(_) | AppError::Slug(_) => {
                "Request could not be processed"
            }
            AppError::List(ListError::Load(_)) | AppError::Load(_) => "Failed to load data",
            AppError::List(ListError::Bulk(_) | ListError::Action { .. }) | AppError::Api(_) => {
                "Action failed"
            }
            AppError::List(_) => "Invalid list request",
            AppError::Tool(_) => "Invalid tool input",
            AppError::Config(_) | AppError::Infra(InfraError::Configuration { .. }) => {
                "Configuration is invalid"
            }
            AppError::Infra(InfraError::Telemetry(_)) => "Logging subsystem could not start",
            AppError::Infra(InfraError::Io(_)) => "I/O failure",
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}
