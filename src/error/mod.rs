//! Error types for resolution, configuration and rendering.

use std::path::PathBuf;

use thiserror::Error;

use crate::mvc::naming::Role;

/// Why a class could not be made available for a role.
#[derive(Debug, Error)]
pub enum ResolutionFailure {
    #[error("no registered class and no default fallback")]
    Unregistered,

    #[error("failed to read definition: {0}")]
    Unreadable(#[source] std::io::Error),

    #[error("malformed definition: {0}")]
    Malformed(String),

    #[error("class is already bound to page type '{claimed_by}'")]
    Conflict { claimed_by: String },
}

/// Raised when neither a custom nor a default class exists for a role.
#[derive(Debug, Error)]
#[error("Unable to set up {role} '{class_name}'{}: {reason}", location(.path))]
pub struct ResolutionError {
    pub role: Role,
    pub class_name: String,
    pub path: Option<PathBuf>,
    #[source]
    pub reason: ResolutionFailure,
}

fn location(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => format!(" ({})", path.display()),
        None => String::new(),
    }
}

impl ResolutionError {
    pub fn unregistered(role: Role, class_name: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            role,
            class_name: class_name.into(),
            path,
            reason: ResolutionFailure::Unregistered,
        }
    }

    pub fn unreadable(
        role: Role,
        class_name: impl Into<String>,
        path: PathBuf,
        err: std::io::Error,
    ) -> Self {
        Self {
            role,
            class_name: class_name.into(),
            path: Some(path),
            reason: ResolutionFailure::Unreadable(err),
        }
    }

    pub fn malformed(
        role: Role,
        class_name: impl Into<String>,
        path: PathBuf,
        message: impl Into<String>,
    ) -> Self {
        Self {
            role,
            class_name: class_name.into(),
            path: Some(path),
            reason: ResolutionFailure::Malformed(message.into()),
        }
    }

    pub fn conflict(role: Role, class_name: impl Into<String>, claimed_by: impl Into<String>) -> Self {
        Self {
            role,
            class_name: class_name.into(),
            path: None,
            reason: ResolutionFailure::Conflict {
                claimed_by: claimed_by.into(),
            },
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// View rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template '{}' not found", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Failed to read template '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Page is no longer available for rendering")]
    PageDropped,
}

/// A unified error type for the whole crate.
#[derive(Debug, Error)]
pub enum MvcError {
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl MvcError {
    /// The failed resolution, if this is one.
    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            Self::Resolution(err) => Some(err),
            _ => None,
        }
    }
}
