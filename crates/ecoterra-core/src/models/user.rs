use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Profile of the signed-in user.
///
/// Persisted as a JSON snapshot next to the token so a session can be
/// restored after a cold start without contacting the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub id: i64,
    #[serde(rename = "fullName", alias = "fullname")]
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub category: String,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the username
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Registration category offered by the sign-up form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Guru,
    Murid,
    Masyarakat,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Guru, Category::Murid, Category::Masyarakat];

    /// Value sent to the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Guru => "guru",
            Category::Murid => "murid",
            Category::Masyarakat => "masyarakat",
        }
    }

    /// Label shown in pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Guru => "Guru",
            Category::Murid => "Murid",
            Category::Masyarakat => "Masyarakat",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// `user` object of an auth response: the profile plus the issued token.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthUser {
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub token: Option<String>,
}

/// Envelope returned by the login, register and user endpoints.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
}
