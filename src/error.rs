use thiserror::Error;

/// Errors that can occur while analyzing a profile
#[derive(Error, Debug)]
pub enum InsightError {
    /// The URL did not match any supported platform
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Profile, channel or handle could not be resolved
    #[error("Not found: {0}")]
    NotFound(String),

    /// Profile exists but is private
    #[error("Access restricted: {0}")]
    AccessRestricted(String),

    /// A collaborator (profile source, language model, photo search) failed
    #[error("{service} request failed: {message}")]
    Upstream { service: String, message: String },

    /// A required API key is absent
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// The platform is recognised but no data source is available for it
    #[error("Unsupported platform: {0}")]
    Unsupported(String),

    /// Failed to send an HTTP request or decode its body
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl InsightError {
    pub fn upstream(service: impl Into<String>, message: impl ToString) -> Self {
        InsightError::Upstream {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Short tag used in logs and rendered reports
    pub fn kind(&self) -> &'static str {
        match self {
            InsightError::InvalidInput(_) => "invalid_input",
            InsightError::NotFound(_) => "not_found",
            InsightError::AccessRestricted(_) => "access_restricted",
            InsightError::Upstream { .. } | InsightError::Http(_) => "upstream_failure",
            InsightError::MissingCredential(_) => "missing_credential",
            InsightError::Unsupported(_) => "unsupported",
            InsightError::Config(_) => "config",
        }
    }

    /// Owned copy for an error reported more than once. Wrapped library
    /// errors keep their kind and message but not their source.
    pub fn replicate(&self) -> Self {
        match self {
            InsightError::InvalidInput(m) => InsightError::InvalidInput(m.clone()),
            InsightError::NotFound(m) => InsightError::NotFound(m.clone()),
            InsightError::AccessRestricted(m) => InsightError::AccessRestricted(m.clone()),
            InsightError::Upstream { service, message } => InsightError::Upstream {
                service: service.clone(),
                message: message.clone(),
            },
            InsightError::MissingCredential(m) => InsightError::MissingCredential(m.clone()),
            InsightError::Unsupported(m) => InsightError::Unsupported(m.clone()),
            InsightError::Http(e) => InsightError::upstream("http", e),
            InsightError::Config(e) => {
                InsightError::Config(config::ConfigError::Message(e.to_string()))
            }
        }
    }
}
