//! Stats API tests

use std::sync::{Arc, Once};

use actix_web::App;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::{Duration, Utc};
use serde_json::Value;
use tempfile::TempDir;

use linktrack::config::init_config;
use linktrack::runtime::lifetime::startup::StartupContext;
use linktrack::runtime::modes::server::configure_app;
use linktrack::services::{StatsPeriod, StatsService};
use linktrack::storage::{NewLink, SeaOrmStorage};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config();
    });
}

async fn create_context() -> (TempDir, StartupContext) {
    init_static_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("stats_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");
    (temp_dir, StartupContext::from_storage(Arc::new(storage)))
}

macro_rules! tracker_app {
    ($ctx:expr) => {{
        let ctx = $ctx.clone();
        test::init_service(App::new().configure(move |cfg| configure_app(cfg, &ctx))).await
    }};
}

async fn seed(
    ctx: &StartupContext,
    code: &str,
    agent: &str,
    age: Duration,
    clicked: bool,
    converted: bool,
) {
    let created_at = Utc::now() - age;
    ctx.storage
        .insert_link(&NewLink {
            tracking_id: code.to_string(),
            contact_id: format!("contact-{}", code),
            contact_email: Some(format!("{}@example.com", code)),
            agent_type: agent.to_string(),
            original_url: "https://x.test/stats".to_string(),
            created_at,
        })
        .await
        .unwrap();
    if clicked {
        ctx.storage.mark_first_click(code, created_at).await.unwrap();
    }
    if converted {
        ctx.storage.mark_converted(code, created_at).await.unwrap();
    }
}

macro_rules! get_stats {
    ($app:expr, $query:expr) => {{
        let req = TestRequest::get()
            .uri(&format!("/api/stats{}", $query))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[tokio::test]
async fn test_today_excludes_older_links() {
    let (_dir, ctx) = create_context().await;
    seed(&ctx, "today001", "post_call", Duration::zero(), true, false).await;
    seed(&ctx, "older001", "post_call", Duration::days(2), true, true).await;
    let app = tracker_app!(ctx);

    let today = get_stats!(app, "?period=today");
    assert_eq!(today["period"], "today");
    assert_eq!(today["overview"]["totalLinks"], 1);
    assert_eq!(today["overview"]["totalConverted"], 0);
    let recent = today["recentActivity"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["trackingId"], "today001");

    let all = get_stats!(app, "?period=all");
    assert_eq!(all["overview"]["totalLinks"], 2);
    assert_eq!(all["overview"]["totalClicked"], 2);
    assert_eq!(all["overview"]["clickRate"], 100.0);
    assert_eq!(all["overview"]["conversionRate"], 50.0);

    let fallback = get_stats!(app, "?period=fortnight");
    assert_eq!(fallback["period"], "all");
    assert_eq!(fallback["overview"]["totalLinks"], 2);

    // 只接受小写原值
    let upper = get_stats!(app, "?period=TODAY");
    assert_eq!(upper["period"], "all");
    assert_eq!(upper["overview"]["totalLinks"], 2);
}

#[tokio::test]
async fn test_week_and_month_windows() {
    let (_dir, ctx) = create_context().await;
    seed(&ctx, "days0003", "post_call", Duration::days(3), false, false).await;
    seed(&ctx, "days0020", "post_call", Duration::days(20), false, false).await;
    seed(&ctx, "days0090", "post_call", Duration::days(90), false, false).await;
    let app = tracker_app!(ctx);

    let week = get_stats!(app, "?period=week");
    assert_eq!(week["overview"]["totalLinks"], 1);

    let month = get_stats!(app, "?period=month");
    assert_eq!(month["overview"]["totalLinks"], 2);
}

#[tokio::test]
async fn test_empty_store_rates() {
    let (_dir, ctx) = create_context().await;
    let app = tracker_app!(ctx);

    let stats = get_stats!(app, "");
    assert_eq!(stats["overview"]["totalLinks"], 0);
    assert_eq!(stats["overview"]["clickRate"], 0.0);
    assert!(stats["overview"]["conversionRate"].is_null());
    assert!(stats["byAgent"].as_array().unwrap().is_empty());
    assert!(stats["timestamp"].is_string());
}

#[tokio::test]
async fn test_agent_filter_and_by_agent_ordering() {
    let (_dir, ctx) = create_context().await;
    seed(&ctx, "pc000001", "post_call", Duration::zero(), true, true).await;
    seed(&ctx, "pc000002", "post_call", Duration::zero(), false, false).await;
    seed(&ctx, "sv000001", "support_voice", Duration::zero(), true, false).await;
    seed(&ctx, "sc000001", "support_chat", Duration::zero(), false, false).await;
    seed(&ctx, "ob000001", "outbound", Duration::zero(), false, false).await;
    let app = tracker_app!(ctx);

    let stats = get_stats!(app, "?period=today&agentType=post_call");

    let overview = &stats["overview"];
    assert_eq!(overview["totalLinks"], 2);
    assert_eq!(overview["totalClicked"], 1);
    assert_eq!(overview["clickRate"], 50.0);
    assert_eq!(overview["conversionRate"], 100.0);

    // byAgent 不受 agentType 过滤影响
    let order: Vec<&str> = stats["byAgent"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["agentType"].as_str().unwrap())
        .collect();
    assert_eq!(
        order,
        vec!["support_chat", "support_voice", "post_call", "outbound"]
    );

    // recentActivity 受 agentType 过滤，且不含邮箱
    let recent = stats["recentActivity"].as_array().unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|l| l["agentType"] == "post_call"));
    assert!(recent.iter().all(|l| l.get("contactEmail").is_none()));
}

#[tokio::test]
async fn test_recent_activity_limit_and_order() {
    let (_dir, ctx) = create_context().await;
    for i in 0..5 {
        seed(
            &ctx,
            &format!("lim0000{}", i),
            "post_call",
            Duration::minutes(10 - i),
            false,
            false,
        )
        .await;
    }

    let service = StatsService::new(ctx.storage.clone()).with_recent_limit(3);
    let report = service.get_stats(StatsPeriod::All, None).await.unwrap();

    assert_eq!(report.overview.total_links, 5);
    let codes: Vec<&str> = report
        .recent_activity
        .iter()
        .map(|l| l.tracking_id.as_str())
        .collect();
    assert_eq!(codes, vec!["lim00004", "lim00003", "lim00002"]);
}
