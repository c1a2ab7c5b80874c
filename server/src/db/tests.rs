//! Database Integration Tests
//!
//! Comprehensive tests for PostgreSQL operations.

#[cfg(test)]
mod postgres_tests {
    use super::super::*;
    use crate::permissions::RoleName;
    use chrono::{Duration, Utc};
    use sqlx::PgPool;
    use uuid::Uuid;

    // ========================================================================
    // User Tests
    // ========================================================================

    #[sqlx::test]
    async fn test_create_and_find_user(pool: PgPool) {
        let user = create_user(&pool, "Test User", "test@example.com", "hash123", RoleName::User)
            .await
            .expect("Failed to create user");

        assert_eq!(user.name, "Test User");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, RoleName::User);
        assert!(!user.banned);
        assert!(!user.email_verified);

        // Find by ID
        let found = find_user_by_id(&pool, user.id)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(found.id, user.id);

        // Find by email
        let found = find_user_by_email(&pool, "test@example.com")
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(found.id, user.id);

        assert!(email_exists(&pool, "test@example.com").await.unwrap());
        assert!(!email_exists(&pool, "other@example.com").await.unwrap());
    }

    #[sqlx::test]
    async fn test_email_uniqueness(pool: PgPool) {
        create_user(&pool, "First", "dup@example.com", "hash", RoleName::User)
            .await
            .expect("Failed to create user");

        let result = create_user(&pool, "Second", "dup@example.com", "hash", RoleName::User).await;
        assert!(result.is_err(), "Duplicate email should be rejected");
    }

    #[sqlx::test]
    async fn test_update_user_role(pool: PgPool) {
        let user = create_user(&pool, "Promotee", "promote@example.com", "hash", RoleName::User)
            .await
            .expect("Failed to create user");

        let updated = update_user_role(&pool, user.id, RoleName::Admin)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(updated.role, RoleName::Admin);

        // Unknown user is None, not an error
        let missing = update_user_role(&pool, Uuid::now_v7(), RoleName::Admin)
            .await
            .expect("Query failed");
        assert!(missing.is_none());
    }

    #[sqlx::test]
    async fn test_partial_update_keeps_unset_fields(pool: PgPool) {
        let user = create_user(&pool, "Original", "partial@example.com", "hash", RoleName::User)
            .await
            .expect("Failed to create user");

        let changes = UserChanges {
            name: Some("Renamed".into()),
            ..UserChanges::default()
        };
        let updated = update_user(&pool, user.id, changes)
            .await
            .expect("Query failed")
            .expect("User not found");

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "partial@example.com");
        assert_eq!(updated.role, RoleName::User);
        assert!(!updated.banned);
    }

    #[sqlx::test]
    async fn test_ban_lifecycle(pool: PgPool) {
        let user = create_user(&pool, "Banned", "ban@example.com", "hash", RoleName::User)
            .await
            .expect("Failed to create user");

        let banned = set_user_ban(&pool, user.id, "Spamming", None)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert!(banned.banned);
        assert_eq!(banned.ban_reason.as_deref(), Some("Spamming"));
        assert!(banned.is_actively_banned(Utc::now()));

        let unbanned = clear_user_ban(&pool, user.id)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert!(!unbanned.banned);
        assert!(unbanned.ban_reason.is_none());
        assert!(!unbanned.is_actively_banned(Utc::now()));
    }

    #[sqlx::test]
    async fn test_expired_ban_is_not_active(pool: PgPool) {
        let user = create_user(&pool, "Expired", "expired@example.com", "hash", RoleName::User)
            .await
            .expect("Failed to create user");

        let expired_at = Utc::now() - Duration::hours(1);
        let banned = set_user_ban(&pool, user.id, "Temporary", Some(expired_at))
            .await
            .expect("Query failed")
            .expect("User not found");

        assert!(banned.banned);
        assert!(!banned.is_actively_banned(Utc::now()));
    }

    #[sqlx::test]
    async fn test_delete_user(pool: PgPool) {
        let user = create_user(&pool, "Doomed", "doomed@example.com", "hash", RoleName::User)
            .await
            .expect("Failed to create user");

        assert!(delete_user(&pool, user.id).await.unwrap());
        assert!(find_user_by_id(&pool, user.id).await.unwrap().is_none());

        // Second delete is a no-op
        assert!(!delete_user(&pool, user.id).await.unwrap());
    }

    #[sqlx::test]
    async fn test_user_stats(pool: PgPool) {
        create_user(&pool, "A", "a@example.com", "hash", RoleName::Admin)
            .await
            .unwrap();
        create_user(&pool, "M", "m@example.com", "hash", RoleName::Moderator)
            .await
            .unwrap();
        create_user(&pool, "U1", "u1@example.com", "hash", RoleName::User)
            .await
            .unwrap();
        create_user(&pool, "U2", "u2@example.com", "hash", RoleName::User)
            .await
            .unwrap();

        let stats = user_stats(&pool).await.expect("Query failed");
        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.total_admins, 1);
        assert_eq!(stats.total_moderators, 1);
        assert_eq!(stats.total_regular_users, 2);
        // All four were just created
        assert_eq!(stats.recent_signups, 4);
    }

    #[sqlx::test]
    async fn test_list_users_newest_first(pool: PgPool) {
        for i in 0..3 {
            create_user(
                &pool,
                &format!("User {i}"),
                &format!("list{i}@example.com"),
                "hash",
                RoleName::User,
            )
            .await
            .unwrap();
        }

        let users = list_users(&pool).await.expect("Query failed");
        assert_eq!(users.len(), 3);
        for pair in users.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    // ========================================================================
    // Session Tests
    // ========================================================================

    #[sqlx::test]
    async fn test_session_lifecycle(pool: PgPool) {
        let user = create_user(&pool, "Sess", "sess@example.com", "hash", RoleName::User)
            .await
            .unwrap();

        let expires = Utc::now() + Duration::days(7);
        let session = create_session(&pool, user.id, "hash-abc", expires, None, Some("tests"))
            .await
            .expect("Failed to create session");
        assert_eq!(session.user_id, user.id);

        let found = find_active_session(&pool, "hash-abc")
            .await
            .expect("Query failed")
            .expect("Session not found");
        assert_eq!(found.id, session.id);

        assert!(delete_session(&pool, "hash-abc").await.unwrap());
        assert!(find_active_session(&pool, "hash-abc").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_expired_session_is_not_returned(pool: PgPool) {
        let user = create_user(&pool, "Old", "old@example.com", "hash", RoleName::User)
            .await
            .unwrap();

        let expired = Utc::now() - Duration::minutes(5);
        create_session(&pool, user.id, "hash-old", expired, None, None)
            .await
            .unwrap();

        assert!(find_active_session(&pool, "hash-old").await.unwrap().is_none());

        // Purge removes the stale row
        let purged = purge_expired_sessions(&pool).await.unwrap();
        assert_eq!(purged, 1);
    }

    #[sqlx::test]
    async fn test_revoke_all_sessions_for_user(pool: PgPool) {
        let user = create_user(&pool, "Multi", "multi@example.com", "hash", RoleName::User)
            .await
            .unwrap();

        let expires = Utc::now() + Duration::days(1);
        create_session(&pool, user.id, "hash-1", expires, None, None)
            .await
            .unwrap();
        create_session(&pool, user.id, "hash-2", expires, None, None)
            .await
            .unwrap();

        let revoked = delete_sessions_for_user(&pool, user.id).await.unwrap();
        assert_eq!(revoked, 2);
        assert!(find_active_session(&pool, "hash-1").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_sessions_cascade_on_user_delete(pool: PgPool) {
        let user = create_user(&pool, "Cascade", "cascade@example.com", "hash", RoleName::User)
            .await
            .unwrap();

        let expires = Utc::now() + Duration::days(1);
        create_session(&pool, user.id, "hash-cascade", expires, None, None)
            .await
            .unwrap();

        delete_user(&pool, user.id).await.unwrap();
        assert!(find_active_session(&pool, "hash-cascade")
            .await
            .unwrap()
            .is_none());
    }
}
