use thiserror::Error;

pub type BootstrapResult<T> = Result<T, BootstrapError>;

/// Every fatal condition of a run. None of these are recoverable mid-run;
/// `main` maps all of them to exit code 2.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("SHORTCUT_TOKEN env var is required.")]
    MissingToken,

    #[error("configuration has no milestone block")]
    MissingMilestone,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("Missing project or epic for story '{story}' (project '{project}', epic '{epic}')")]
    UnresolvedStory {
        story: String,
        project: String,
        epic: String,
    },

    #[error("unknown timezone '{0}'")]
    Timezone(String),

    /// Non-2xx response, after retries where the status was retryable.
    #[error("during {context}: HTTP {status} {body}")]
    Api {
        context: String,
        status: u16,
        body: String,
    },

    /// The transport failure is rendered through the source chain.
    #[error("during {context}")]
    Http {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BootstrapError {
    pub fn http(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            context: context.into(),
            source,
        }
    }
}
