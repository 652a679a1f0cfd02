//! Storage backend tests
//!
//! Exercises SeaOrmStorage against a fresh SQLite database per test.

use std::sync::{Arc, Once};

use chrono::{Duration, Utc};
use tempfile::TempDir;

use linktrack::config::init_config;
use linktrack::errors::TrackerError;
use linktrack::storage::{LinkFilter, NewClick, NewConversion, NewLink, SeaOrmStorage};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_storage() -> (TempDir, Arc<SeaOrmStorage>) {
    init_static_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("storage_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (temp_dir, Arc::new(storage))
}

fn new_link(code: &str, contact: &str, agent: &str) -> NewLink {
    NewLink {
        tracking_id: code.to_string(),
        contact_id: contact.to_string(),
        contact_email: None,
        agent_type: agent.to_string(),
        original_url: format!("https://example.com/{}", code),
        created_at: Utc::now(),
    }
}

// =============================================================================
// Links
// =============================================================================

#[tokio::test]
async fn test_insert_and_get_link() {
    let (_dir, storage) = create_storage().await;

    let mut link = new_link("abc12345", "42", "post_call");
    link.contact_email = Some("a@example.com".to_string());
    let created = storage.insert_link(&link).await.unwrap();

    assert!(created.id > 0);
    assert!(!created.clicked);
    assert!(!created.converted);
    assert!(created.clicked_at.is_none());

    let fetched = storage.get_link("abc12345").await.unwrap().unwrap();
    assert_eq!(fetched.contact_id, "42");
    assert_eq!(fetched.contact_email.as_deref(), Some("a@example.com"));
    assert_eq!(fetched.original_url, "https://example.com/abc12345");

    assert!(storage.get_link("missing1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_tracking_id_is_rejected() {
    let (_dir, storage) = create_storage().await;

    storage.insert_link(&new_link("dup00001", "1", "a")).await.unwrap();
    let err = storage
        .insert_link(&new_link("dup00001", "2", "b"))
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::DatabaseOperation(_)));
    assert_eq!(storage.count_links().await.unwrap(), 1);
}

#[tokio::test]
async fn test_mark_first_click_only_once() {
    let (_dir, storage) = create_storage().await;
    storage.insert_link(&new_link("first001", "1", "a")).await.unwrap();

    let first = Utc::now() - Duration::minutes(5);
    assert!(storage.mark_first_click("first001", first).await.unwrap());
    assert!(!storage.mark_first_click("first001", Utc::now()).await.unwrap());

    let link = storage.get_link("first001").await.unwrap().unwrap();
    assert!(link.clicked);
    assert_eq!(link.clicked_at, Some(first));
}

#[tokio::test]
async fn test_latest_clicked_link_wins_attribution() {
    let (_dir, storage) = create_storage().await;
    let now = Utc::now();

    storage.insert_link(&new_link("older001", "7", "a")).await.unwrap();
    storage.insert_link(&new_link("newer001", "7", "a")).await.unwrap();
    storage.insert_link(&new_link("never001", "7", "a")).await.unwrap();
    storage.insert_link(&new_link("other001", "8", "a")).await.unwrap();

    storage
        .mark_first_click("older001", now - Duration::hours(2))
        .await
        .unwrap();
    storage
        .mark_first_click("newer001", now - Duration::hours(1))
        .await
        .unwrap();
    storage.mark_first_click("other001", now).await.unwrap();

    let attributed = storage
        .find_latest_clicked_for_contact("7")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attributed.tracking_id, "newer001");

    assert!(
        storage
            .find_latest_clicked_for_contact("9")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_attribution_tie_breaks_on_newest_row() {
    let (_dir, storage) = create_storage().await;
    let at = Utc::now();

    storage.insert_link(&new_link("tieaaaaa", "5", "a")).await.unwrap();
    storage.insert_link(&new_link("tiebbbbb", "5", "a")).await.unwrap();
    storage.mark_first_click("tieaaaaa", at).await.unwrap();
    storage.mark_first_click("tiebbbbb", at).await.unwrap();

    let attributed = storage
        .find_latest_clicked_for_contact("5")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attributed.tracking_id, "tiebbbbb");
}

#[tokio::test]
async fn test_mark_converted_restamps() {
    let (_dir, storage) = create_storage().await;
    storage.insert_link(&new_link("conv0001", "1", "a")).await.unwrap();

    let first = Utc::now() - Duration::minutes(10);
    let second = Utc::now();
    storage.mark_converted("conv0001", first).await.unwrap();
    storage.mark_converted("conv0001", second).await.unwrap();

    let link = storage.get_link("conv0001").await.unwrap().unwrap();
    assert!(link.converted);
    assert_eq!(link.converted_at, Some(second));
}

#[tokio::test]
async fn test_outcomes_and_recent_links_respect_filter() {
    let (_dir, storage) = create_storage().await;
    let now = Utc::now();

    let mut old = new_link("old00001", "1", "post_call");
    old.created_at = now - Duration::days(40);
    storage.insert_link(&old).await.unwrap();

    let mut mid = new_link("mid00001", "2", "support_chat");
    mid.created_at = now - Duration::days(3);
    storage.insert_link(&mid).await.unwrap();

    storage
        .insert_link(&new_link("new00001", "3", "post_call"))
        .await
        .unwrap();
    storage.mark_first_click("new00001", now).await.unwrap();

    let all = storage.load_link_outcomes(&LinkFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let recent_window = LinkFilter {
        created_after: Some(now - Duration::days(7)),
        agent_type: None,
    };
    let outcomes = storage.load_link_outcomes(&recent_window).await.unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes.iter().filter(|o| o.clicked).count(), 1);

    let post_call_only = LinkFilter {
        agent_type: Some("post_call".to_string()),
        ..recent_window.clone()
    };
    let outcomes = storage.load_link_outcomes(&post_call_only).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].agent_type, "post_call");

    let recent = storage.load_recent_links(&LinkFilter::default(), 2).await.unwrap();
    let codes: Vec<&str> = recent.iter().map(|l| l.tracking_id.as_str()).collect();
    assert_eq!(codes, vec!["new00001", "mid00001"]);
}

// =============================================================================
// Clicks & conversions
// =============================================================================

#[tokio::test]
async fn test_clicks_newest_first() {
    let (_dir, storage) = create_storage().await;
    storage.insert_link(&new_link("click001", "1", "a")).await.unwrap();

    let now = Utc::now();
    for (offset, ua) in [(3, "ua-old"), (1, "ua-new"), (2, "ua-mid")] {
        storage
            .insert_click(&NewClick {
                tracking_id: "click001".to_string(),
                clicked_at: now - Duration::minutes(offset),
                ip_address: Some("203.0.113.9".to_string()),
                user_agent: Some(ua.to_string()),
            })
            .await
            .unwrap();
    }

    let clicks = storage.load_clicks("click001").await.unwrap();
    let agents: Vec<&str> = clicks
        .iter()
        .filter_map(|c| c.user_agent.as_deref())
        .collect();
    assert_eq!(agents, vec!["ua-new", "ua-mid", "ua-old"]);
    assert_eq!(storage.count_clicks("click001").await.unwrap(), 3);
    assert_eq!(storage.count_clicks("nothing1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_conversion_with_and_without_tracking_id() {
    let (_dir, storage) = create_storage().await;

    storage
        .insert_conversion(&NewConversion {
            contact_id: "42".to_string(),
            tracking_id: None,
            conversion_type: "appointment_booked".to_string(),
            created_at: Utc::now() - Duration::minutes(1),
            metadata: Some(r#"{"appointmentId":null}"#.to_string()),
        })
        .await
        .unwrap();
    storage
        .insert_conversion(&NewConversion {
            contact_id: "42".to_string(),
            tracking_id: Some("abc12345".to_string()),
            conversion_type: "appointment_booked".to_string(),
            created_at: Utc::now(),
            metadata: None,
        })
        .await
        .unwrap();

    let conversions = storage.load_conversions_for_contact("42").await.unwrap();
    assert_eq!(conversions.len(), 2);
    assert_eq!(conversions[0].tracking_id.as_deref(), Some("abc12345"));
    assert!(conversions[1].tracking_id.is_none());
}

#[tokio::test]
async fn test_ping_and_backend_name() {
    let (_dir, storage) = create_storage().await;
    assert!(storage.ping().await.is_ok());
    assert_eq!(storage.get_backend_config().storage_type, "sqlite");
}
