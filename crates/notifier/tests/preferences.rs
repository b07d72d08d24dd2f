//! Preference registration and resolution through the service layer

mod common;

use std::collections::HashSet;

use common::{console_env, prefs};
use notifier::NotifierStore;
use notifier_core::NotifierError;
use notifier_models::{Group, PreferenceChange, User};

#[tokio::test]
async fn test_group_grant_then_user_override() {
    let env = console_env().await;

    env.service
        .register_notification("test-not-1", Some("Test Notification 1"), None, Some(vec!["email", "sms"].into()), true)
        .await
        .unwrap();

    let group1 = Group::new(10, "group1");
    env.service
        .update_group_preferences("test-not-1", &group1, &prefs(&[("email", true)]))
        .await
        .unwrap();

    let user1 = User::new(1, "user1", "user1@example.com").with_group(group1.clone());

    let map = env
        .service
        .effective_preferences("test-not-1", &user1)
        .await
        .unwrap();
    assert_eq!(map.get("email"), Some(&true));
    assert_eq!(map.get("sms"), Some(&false));

    // The user's own opt-out supersedes the group grant
    env.service
        .update_preferences("test-not-1", &user1, &prefs(&[("email", false)]))
        .await
        .unwrap();

    let map = env
        .service
        .effective_preferences("test-not-1", &user1)
        .await
        .unwrap();
    assert_eq!(map.get("email"), Some(&false));
    assert_eq!(map.get("sms"), Some(&false));
}

#[tokio::test]
async fn test_reregistration_replaces_sets() {
    let env = console_env().await;

    let first = env
        .service
        .register_notification(
            "test-not-1",
            Some("Test Notification 1"),
            Some(vec!["perm-1"].into()),
            Some(vec!["email", "sms"].into()),
            true,
        )
        .await
        .unwrap();
    assert_eq!(first.backend_ids.len(), 2);

    // Identical arguments leave the definition unchanged
    let again = env
        .service
        .register_notification(
            "test-not-1",
            Some("Test Notification 1"),
            Some(vec!["perm-1"].into()),
            Some(vec!["email", "sms"].into()),
            true,
        )
        .await
        .unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.permissions, HashSet::from(["perm-1".to_string()]));
    assert_eq!(again.backend_ids, first.backend_ids);

    // Narrower arguments replace, not extend, the stored sets
    let narrowed = env
        .service
        .register_notification("test-not-1", Some("Renamed"), None, Some("email".into()), false)
        .await
        .unwrap();
    assert_eq!(narrowed.id, first.id);
    assert_eq!(narrowed.display_name, "Renamed");
    assert!(!narrowed.public);
    assert!(narrowed.permissions.is_empty());

    let email = env.store.find_backend_by_name("email").await.unwrap().unwrap();
    assert_eq!(narrowed.backend_ids, HashSet::from([email.id.unwrap()]));
}

#[tokio::test]
async fn test_update_preferences_reports_changes() {
    let env = console_env().await;

    env.service
        .register_notification("test-not-1", None, None, None, true)
        .await
        .unwrap();

    let user1 = User::new(1, "user1", "user1@example.com");

    let changes = env
        .service
        .update_preferences("test-not-1", &user1, &prefs(&[("email", true), ("sms", false)]))
        .await
        .unwrap();
    assert_eq!(changes.get("email"), Some(&PreferenceChange::Created));
    assert_eq!(changes.get("sms"), Some(&PreferenceChange::Created));

    // Re-sending the same values requires no change
    let changes = env
        .service
        .update_preferences("test-not-1", &user1, &prefs(&[("email", true)]))
        .await
        .unwrap();
    assert!(changes.is_empty());

    let changes = env
        .service
        .update_preferences("test-not-1", &user1, &prefs(&[("email", false)]))
        .await
        .unwrap();
    assert_eq!(changes.get("email"), Some(&PreferenceChange::Updated));
}

#[tokio::test]
async fn test_update_preferences_unknown_notification() {
    let env = console_env().await;
    let user1 = User::new(1, "user1", "user1@example.com");

    let err = env
        .service
        .update_preferences("missing", &user1, &prefs(&[("email", true)]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_update_preferences_permission_denied() {
    let env = console_env().await;

    env.service
        .register_notification("gated", None, Some("perm-1".into()), None, true)
        .await
        .unwrap();

    let user1 = User::new(1, "user1", "user1@example.com");
    let err = env
        .service
        .update_preferences("gated", &user1, &prefs(&[("email", true)]))
        .await
        .unwrap_err();
    assert!(matches!(err, NotifierError::PermissionDenied { .. }));

    // No row was written
    let notification = env
        .store
        .find_notification_by_name("gated")
        .await
        .unwrap()
        .unwrap();
    let email = env.store.find_backend_by_name("email").await.unwrap().unwrap();
    let row = env
        .store
        .find_user_preference(1, notification.id.unwrap(), email.id.unwrap())
        .await
        .unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_clear_preferences_reverts_to_group() {
    let env = console_env().await;

    env.service
        .register_notification("test-not-1", None, None, None, true)
        .await
        .unwrap();

    let group1 = Group::new(10, "group1");
    env.service
        .update_group_preferences("test-not-1", &group1, &prefs(&[("email", true)]))
        .await
        .unwrap();

    let user1 = User::new(1, "user1", "user1@example.com").with_group(group1);
    env.service
        .update_preferences("test-not-1", &user1, &prefs(&[("email", false)]))
        .await
        .unwrap();

    let map = env
        .service
        .effective_preferences("test-not-1", &user1)
        .await
        .unwrap();
    assert_eq!(map.get("email"), Some(&false));

    let removed = env.service.clear_preferences(&[user1.clone()]).await.unwrap();
    assert_eq!(removed, 1);

    let map = env
        .service
        .effective_preferences("test-not-1", &user1)
        .await
        .unwrap();
    assert_eq!(map.get("email"), Some(&true));
}

#[tokio::test]
async fn test_group_preference_changes_reported() {
    let env = console_env().await;

    env.service
        .register_notification("test-not-1", None, None, None, true)
        .await
        .unwrap();

    let group1 = Group::new(10, "group1");
    let changes = env
        .service
        .update_group_preferences("test-not-1", &group1, &prefs(&[("email", true)]))
        .await
        .unwrap();
    assert_eq!(changes.get("email"), Some(&PreferenceChange::Created));

    let changes = env
        .service
        .update_group_preferences("test-not-1", &group1, &prefs(&[("email", true)]))
        .await
        .unwrap();
    assert!(changes.is_empty());

    let changes = env
        .service
        .update_group_preferences("test-not-1", &group1, &prefs(&[("email", false)]))
        .await
        .unwrap();
    assert_eq!(changes.get("email"), Some(&PreferenceChange::Updated));
}

#[tokio::test]
async fn test_visible_notifications() {
    let env = console_env().await;

    env.service
        .register_notification("open", None, None, None, true)
        .await
        .unwrap();
    env.service
        .register_notification("hidden", None, None, None, false)
        .await
        .unwrap();
    env.service
        .register_notification("gated", None, Some("perm-1".into()), None, true)
        .await
        .unwrap();

    let user1 = User::new(1, "user1", "user1@example.com");
    let visible = env.service.visible_notifications(&user1).await.unwrap();
    let names: Vec<&str> = visible.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["open"]);

    let privileged = User::new(2, "user2", "user2@example.com").with_permission("perm-1");
    let visible = env.service.visible_notifications(&privileged).await.unwrap();
    assert_eq!(visible.len(), 2);
}

#[tokio::test]
async fn test_effective_preferences_all() {
    let env = console_env().await;

    env.service
        .register_notification("open", None, None, Some("email".into()), true)
        .await
        .unwrap();
    env.service
        .register_notification("gated", None, Some("perm-1".into()), None, true)
        .await
        .unwrap();

    let user1 = User::new(1, "user1", "user1@example.com");
    let all = env.service.effective_preferences_all(&user1).await.unwrap();

    assert!(all.contains_key("open"));
    assert!(!all.contains_key("gated"));
    assert_eq!(all["open"].get("email"), Some(&false));
}

#[tokio::test]
async fn test_bootstrap_preserves_enabled_flag() {
    let env = console_env().await;

    let mut email = env.store.find_backend_by_name("email").await.unwrap().unwrap();
    email.enabled = false;
    email.display_name = "stale".to_string();
    env.store.update_backend(&email).await.unwrap();

    // Re-running bootstrap refreshes metadata but leaves the flag alone
    env.service.initialize().await.unwrap();

    let email = env.store.find_backend_by_name("email").await.unwrap().unwrap();
    assert!(!email.enabled);
    assert_eq!(email.display_name, "Email");
}
