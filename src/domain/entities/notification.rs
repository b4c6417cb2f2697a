use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToastPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub companies_preview: Vec<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ToastPayload {
    pub fn accent(&self) -> &'static str {
        match self.kind.as_str() {
            "report" => "#4c6ef5",
            "data" => "#2f9e44",
            "email" => "#f08c00",
            _ => "#868e96",
        }
    }
}

pub fn parse_toast_payload(raw: &str) -> Result<Vec<ToastPayload>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub payload: ToastPayload,
    pub closing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Warning,
    Error,
}

impl FlashLevel {
    pub fn accent(self) -> &'static str {
        match self {
            FlashLevel::Success => "#2f9e44",
            FlashLevel::Warning => "#f08c00",
            FlashLevel::Error => "#d9480f",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashMessage {
    pub id: u64,
    pub level: FlashLevel,
    pub text: String,
}
