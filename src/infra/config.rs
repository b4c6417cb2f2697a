use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_file: Option<PathBuf>,
    pub notifications_file: Option<PathBuf>,
    pub sync_url: String,
    pub send_url: String,
    pub csrf_token: String,
    pub recipients: Vec<Recipient>,
    pub start_page: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            notifications_file: None,
            sync_url: "http://127.0.0.1:8000/accreditation/sync/".to_string(),
            send_url: "http://127.0.0.1:8000/report/send/".to_string(),
            csrf_token: String::new(),
            recipients: Vec::new(),
            start_page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub username: String,
    pub display_name: String,
    pub email: String,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "metrika", "metrika")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

pub fn default_data_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("companies.csv"))
}

pub fn default_notifications_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_local_dir().join("notifications.json"))
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse config: {}", path.display()))
}

// Missing payload file just means there is nothing to show.
pub fn read_notifications_payload(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}
