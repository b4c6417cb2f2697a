use serde::Deserialize;

use crate::domain::entities::company::Company;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    Message(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Message(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for SourceError {}

pub trait CompanySource: Send + Sync {
    fn load(&self) -> Result<Vec<Company>, SourceError>;
}

/// Declared shape of the accreditation/report endpoints' responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyncOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<InnSyncResult>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InnSyncResult {
    pub inn: String,
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
