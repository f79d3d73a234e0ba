use serde::{Deserialize, Serialize};

/// Identity of the signed-in user as reported by `GET /user`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserInfo {
    pub user_id: String,
    pub username: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub groups: Vec<String>,
    pub is_admin: bool,
}

impl UserInfo {
    /// Best available name for display
    pub fn display_name(&self) -> &str {
        [&self.full_name, &self.username, &self.email, &self.user_id]
            .into_iter()
            .find(|s| !s.is_empty())
            .map(String::as_str)
            .unwrap_or("anonymous")
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
