use thiserror::Error;

/// Error types for Feishu user token acquisition
#[derive(Error, Debug)]
pub enum FeishuAuthError {
    #[error("app_id or app_secret not found in the configuration file. Please provide them first.")]
    MissingCredentials,

    #[error(
        "login_code is required either in command line argument or in the configuration file."
    )]
    MissingLoginCode,

    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to create HTTP client: {0}")]
    ClientCreation(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Feishu API error, code: {code}, msg: {msg}, log_id: {}", .log_id.as_deref().unwrap_or("-"))]
    Api {
        code: i64,
        msg: String,
        log_id: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FeishuAuthError {
    /// Whether this error is a local configuration problem.
    ///
    /// These are raised before any request reaches the provider and are
    /// always fatal; everything else is treated as a remote failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            FeishuAuthError::MissingCredentials
                | FeishuAuthError::MissingLoginCode
                | FeishuAuthError::ConfigParse(_)
                | FeishuAuthError::Io(_)
                | FeishuAuthError::InvalidConfig(_)
        )
    }
}

impl From<ini::Error> for FeishuAuthError {
    fn from(err: ini::Error) -> Self {
        match err {
            ini::Error::Io(e) => FeishuAuthError::Io(e),
            ini::Error::Parse(e) => FeishuAuthError::ConfigParse(e.to_string()),
        }
    }
}

/// Result type alias for Feishu authentication operations
pub type Result<T> = std::result::Result<T, FeishuAuthError>;
