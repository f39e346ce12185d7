use thiserror::Error;

/// Errors raised while loading or rendering prompt templates.
#[derive(Debug, Error)]
pub enum PmError {
    /// No template is registered under this name.
    #[error("prompt template '{name}' is not registered")]
    TemplateNotFound { name: String },

    /// The template source does not parse as Jinja.
    #[error("prompt template '{name}' is invalid: {message}")]
    InvalidTemplate { name: String, message: String },

    /// Rendering failed, usually because a context variable is missing.
    #[error("failed to render prompt template '{name}': {message}")]
    Render { name: String, message: String },

    /// A template directory or file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PmError {
    pub(crate) fn invalid(name: &str, err: &minijinja::Error) -> Self {
        Self::InvalidTemplate {
            name: name.to_owned(),
            message: err.to_string(),
        }
    }

    pub(crate) fn render(name: &str, err: &minijinja::Error) -> Self {
        Self::Render {
            name: name.to_owned(),
            message: err.to_string(),
        }
    }

    /// Name of the template involved, if the error concerns one.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Self::TemplateNotFound { name }
            | Self::InvalidTemplate { name, .. }
            | Self::Render { name, .. } => Some(name),
            Self::Io(_) => None,
        }
    }
}
