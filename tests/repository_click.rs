mod common;

use chrono::{DateTime, TimeZone, Utc};
use link_shortener::domain::entities::{DeviceType, NewClick};
use link_shortener::domain::repositories::{ClickFilter, ClickRepository, DateRange};
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::PgClickRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

fn click(link_id: i64, clicked_at: DateTime<Utc>, device: DeviceType, referer: Option<&str>) -> NewClick {
    NewClick {
        link_id,
        clicked_at,
        user_agent: Some("test-agent".to_string()),
        referer: referer.map(str::to_string),
        ip: Some("10.0.0.1".to_string()),
        country: None,
        device,
    }
}

async fn seeded(pool: &PgPool) -> (i64, i64) {
    let owner_id = common::create_pg_token(pool, "owner").await;
    let link_id = common::create_pg_link(pool, owner_id, "clicks1", "https://example.com/").await;
    (owner_id, link_id)
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_create_click(pool: PgPool) {
    let (_, link_id) = seeded(&pool).await;
    let repo = PgClickRepository::new(Arc::new(pool));

    let stored = repo
        .create_click(click(link_id, at(1, 8), DeviceType::Mobile, Some("https://ref.example")))
        .await
        .unwrap();

    assert_eq!(stored.link_id, link_id);
    assert_eq!(stored.clicked_at, at(1, 8));
    assert_eq!(stored.device, DeviceType::Mobile);
    assert_eq!(stored.referer.as_deref(), Some("https://ref.example"));
    assert!(stored.country.is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_click_for_missing_link_is_rejected(pool: PgPool) {
    let repo = PgClickRepository::new(Arc::new(pool));

    let result = repo
        .create_click(click(424_242, at(1, 8), DeviceType::Other, None))
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_list_and_count_with_range(pool: PgPool) {
    let (_, link_id) = seeded(&pool).await;
    let repo = PgClickRepository::new(Arc::new(pool));
    for (day, hour) in [(1, 9), (2, 9), (3, 9), (4, 9)] {
        repo.create_click(click(link_id, at(day, hour), DeviceType::Desktop, None))
            .await
            .unwrap();
    }

    let range = DateRange::new(Some(at(2, 0)), Some(at(4, 9)));
    let clicks = repo
        .list_clicks(link_id, ClickFilter::new(0, 10).with_range(range))
        .await
        .unwrap();

    let times: Vec<_> = clicks.iter().map(|c| c.clicked_at).collect();
    assert_eq!(times, vec![at(3, 9), at(2, 9)]);
    assert_eq!(repo.count_clicks(link_id, range).await.unwrap(), 2);
    assert_eq!(repo.count_clicks(link_id, DateRange::default()).await.unwrap(), 4);

    let second_page = repo
        .list_clicks(link_id, ClickFilter::new(2, 2))
        .await
        .unwrap();
    assert_eq!(second_page[0].clicked_at, at(2, 9));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_daily_counts(pool: PgPool) {
    let (owner_id, link_id) = seeded(&pool).await;
    let second = common::create_pg_link(&pool, owner_id, "clicks2", "https://example.com/").await;
    let repo = PgClickRepository::new(Arc::new(pool));

    for (id, day, hour) in [(link_id, 1, 1), (link_id, 1, 23), (link_id, 3, 12), (second, 1, 12)] {
        repo.create_click(click(id, at(day, hour), DeviceType::Other, None))
            .await
            .unwrap();
    }

    let per_link = repo
        .daily_counts_for_link(link_id, DateRange::default())
        .await
        .unwrap();
    assert_eq!(per_link.len(), 2);
    assert_eq!(per_link[0].day, at(1, 0).date_naive());
    assert_eq!(per_link[0].clicks, 2);

    let per_owner = repo
        .daily_counts_for_owner(owner_id, DateRange::default())
        .await
        .unwrap();
    assert_eq!(per_owner[0].clicks, 3);
    assert_eq!(per_owner[1].clicks, 1);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_group_counts(pool: PgPool) {
    let (_, link_id) = seeded(&pool).await;
    let repo = PgClickRepository::new(Arc::new(pool));

    for (device, referer) in [
        (DeviceType::Mobile, Some("https://b.example")),
        (DeviceType::Mobile, Some("https://a.example")),
        (DeviceType::Desktop, Some("https://a.example")),
        (DeviceType::Bot, None),
    ] {
        repo.create_click(click(link_id, at(1, 12), device, referer))
            .await
            .unwrap();
    }

    let devices = repo
        .device_counts(link_id, DateRange::default())
        .await
        .unwrap();
    assert_eq!(devices[0].key.as_deref(), Some("mobile"));
    assert_eq!(devices[0].clicks, 2);

    let referers = repo
        .referer_counts(link_id, DateRange::default())
        .await
        .unwrap();
    let keys: Vec<_> = referers.iter().map(|g| g.key.as_deref()).collect();
    assert_eq!(
        keys,
        vec![Some("https://a.example"), Some("https://b.example"), None]
    );

    let ips = repo.ip_counts(link_id, DateRange::default()).await.unwrap();
    assert_eq!(ips.len(), 1);
    assert_eq!(ips[0].clicks, 4);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_totals_for_owner(pool: PgPool) {
    let (owner_id, link_id) = seeded(&pool).await;
    sqlx::query("UPDATE links SET clicks = 7 WHERE id = $1")
        .bind(link_id)
        .execute(&pool)
        .await
        .unwrap();
    let repo = PgClickRepository::new(Arc::new(pool));

    let totals = repo.totals_for_owner(owner_id).await.unwrap();

    assert_eq!(totals.total_links, 1);
    assert_eq!(totals.total_clicks, 7);
}
