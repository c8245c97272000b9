//! User search over the profile collection.

use crate::error::CalmateResult;
use crate::store::MemoryStore;
use crate::user::UserProfile;

/// Case-insensitive substring search over email and display name.
///
/// Fetches the whole collection and filters client-side — O(total users)
/// per search, no index, no pagination. A blank term returns nothing.
pub async fn search_users(store: &MemoryStore, term: &str) -> CalmateResult<Vec<UserProfile>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Ok(Vec::new());
    }

    let users = store.all_users().await?;
    Ok(users.into_iter().filter(|u| u.matches(&term)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(uid: &str, name: Option<&str>, email: &str) -> UserProfile {
        UserProfile {
            uid: uid.to_string(),
            name: name.map(String::from),
            email: email.to_string(),
            photo_url: None,
            created_at: Utc::now(),
        }
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .upsert_user(profile("1", Some("Alice Smith"), "alice@example.com"))
            .await
            .unwrap();
        store
            .upsert_user(profile("2", None, "bob@example.com"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_blank_term_returns_nothing() {
        let store = seeded_store().await;
        assert!(search_users(&store, "").await.unwrap().is_empty());
        assert!(search_users(&store, "   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_matches_email_and_name_case_insensitively() {
        let store = seeded_store().await;

        let by_name = search_users(&store, "SMITH").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].uid, "1");

        let by_email = search_users(&store, "bob@").await.unwrap();
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].uid, "2");

        let both = search_users(&store, "example.com").await.unwrap();
        assert_eq!(both.len(), 2);
    }
}
