use thiserror::Error;

/// Result alias for `tierlabel`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the labelling pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Input was empty.
    #[error("empty input provided")]
    EmptyInput,

    /// Vector dimension mismatch.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// A collaborator returned a sequence of the wrong length.
    #[error("{stage} returned {found} items, expected {expected}")]
    LengthMismatch {
        /// Pipeline stage that broke the contract.
        stage: &'static str,
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Invalid number of clusters requested.
    #[error("cannot create {requested} clusters from {n_items} items")]
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// A cluster id had no label slot.
    #[error("no label recorded for cluster id {id}")]
    UnknownCluster {
        /// The offending cluster id.
        id: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// I/O failure while reading input or configuration.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML parse failure.
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Bad cleaning rule.
    #[error(transparent)]
    Regex(#[from] regex::Error),

    /// JSON rendering failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}
