use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxonError {
    #[error(
        "Tier count mismatch: {items} items but {first_tier} first-tier + {subsequent_tier} subsequent-tier binds"
    )]
    TierCountMismatch {
        items: usize,
        first_tier: usize,
        subsequent_tier: usize,
    },

    #[error("Parent '{parent}' is not an earlier item of the taxonomy")]
    UnknownParent { parent: String },

    #[error("Tier bind at item position {position} does not match the recorded items")]
    BindMismatch { position: usize },

    #[error("Classification entry {position} {reason}")]
    InvalidEntry {
        position: usize,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TaxonError>;

impl TaxonError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TierCountMismatch { .. }
            | Self::BindMismatch { .. }
            | Self::InvalidEntry { .. } => 2,
            Self::UnknownParent { .. } => 3,
            Self::TomlDe(_) | Self::Json(_) => 4,
            Self::Io(_) => 5,
            _ => 1,
        }
    }
}
