//! Gardener profile

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The single local user of the app
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub profession: String,
    /// Free-text home location, e.g. "Model Town, Lahore"
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile form; missing fields are saved as empty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub profession: String,
    #[serde(default)]
    pub location: String,
}

impl UserProfile {
    /// Build the saved profile, keeping the original creation time
    pub fn from_input(
        input: ProfileInput,
        existing: Option<&UserProfile>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            phone: input.phone.trim().to_string(),
            profession: input.profession.trim().to_string(),
            location: input.location.trim().to_string(),
            created_at: existing.map(|p| p.created_at).unwrap_or(now),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_resave_keeps_created_at() {
        let first_saved = Utc::now() - Duration::days(3);
        let first = UserProfile::from_input(
            ProfileInput {
                name: " Ayesha ".to_string(),
                ..Default::default()
            },
            None,
            first_saved,
        );
        assert_eq!(first.name, "Ayesha");
        assert_eq!(first.created_at, first_saved);

        let now = Utc::now();
        let second = UserProfile::from_input(
            ProfileInput {
                name: "Ayesha".to_string(),
                profession: "Architect".to_string(),
                ..Default::default()
            },
            Some(&first),
            now,
        );
        assert_eq!(second.created_at, first_saved);
        assert_eq!(second.updated_at, now);
        assert_eq!(second.profession, "Architect");
    }
}
