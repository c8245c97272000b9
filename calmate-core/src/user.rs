//! User profiles and the authenticated principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record in the `users` collection. Read-only projection of the
/// identity provider's account; never mutated locally after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub name: Option<String>,
    pub email: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Placeholder for a notification whose sender has no profile record.
    pub fn unknown(uid: &str) -> Self {
        UserProfile {
            uid: uid.to_string(),
            name: Some("Unknown".to_string()),
            email: "Unknown".to_string(),
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    /// Display label: name when present, email otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }

    /// Case-insensitive substring match on email or display name.
    /// `term` must already be lowercased.
    pub fn matches(&self, term: &str) -> bool {
        self.email.to_lowercase().contains(term)
            || self
                .name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(term))
    }
}

/// The currently authenticated user. Absent entirely when signed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl Principal {
    /// The profile document written on first sign-in.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            uid: self.id.clone(),
            name: self.display_name.clone(),
            email: self.email.clone(),
            photo_url: self.photo_url.clone(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_matching() {
        let profile = UserProfile {
            uid: "u1".into(),
            name: Some("Alice Smith".into()),
            email: "alice@example.com".into(),
            photo_url: None,
            created_at: Utc::now(),
        };
        assert!(profile.matches("alice"));
        assert!(profile.matches("smith"));
        assert!(profile.matches("example.com"));
        assert!(!profile.matches("bob"));
        assert_eq!(profile.label(), "Alice Smith");
    }
}
