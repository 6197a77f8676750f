//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Errors that abort a render invocation or the CLI.
///
/// Per-field template problems are not here: they are [`PathError`]s and
/// only ever reach the diagnostic channel.
#[derive(Error, Debug)]
pub enum ChefError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Chef Server API errors
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Error strings returned by the server in an `error` array, joined with ", "
    #[error("{0}")]
    Api(String),

    #[error("Invalid search response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

impl FixSuggestion for ChefError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            ChefError::Config(_) => Some("Check server, client, version and key in chefwiki.yaml"),
            ChefError::ConfigParse(_) => Some("Check YAML syntax: indentation and quoting"),
            ChefError::InvalidUrl(_) => Some("Use a full URL such as https://chef.example.com"),
            ChefError::Io(_) => Some("Check file path and permissions"),
            ChefError::Transport(_) => Some("Check that the Chef Server is reachable"),
            ChefError::Http { .. } => Some("Check the client name and API version"),
            ChefError::Api(_) => Some("Check the search query syntax"),
            ChefError::InvalidResponse(_) => {
                Some("Ensure the server URL points at a Chef Server API")
            }
        }
    }
}

/// Dotted-path resolution failures.
///
/// A missing key is not an error (it resolves to empty text); these are
/// raised only when the key exists but has the wrong shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("attribute {path} is not an object")]
    NotObject { path: String },

    #[error("attribute {path} is an object")]
    IsObject { path: String },
}

impl PathError {
    /// The dotted path the message refers to
    pub fn path(&self) -> &str {
        match self {
            PathError::NotObject { path } | PathError::IsObject { path } => path,
        }
    }
}
