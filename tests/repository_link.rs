mod common;

use link_shortener::domain::entities::NewLink;
use link_shortener::domain::repositories::LinkRepository;
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::PgLinkRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn new_link(owner_id: i64, short_token: &str) -> NewLink {
    NewLink {
        short_token: short_token.to_string(),
        original_url: "https://example.com/".to_string(),
        short_url: format!("{}/{short_token}", common::BASE_URL),
        owner_id,
    }
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_create_link(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let link = repo.create(new_link(owner_id, "abc123")).await.unwrap();

    assert_eq!(link.short_token, "abc123");
    assert_eq!(link.original_url, "https://example.com/");
    assert_eq!(link.owner_id, owner_id);
    assert_eq!(link.clicks, 0);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_duplicate_token_is_conflict(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.create(new_link(owner_id, "dup123")).await.unwrap();
    let result = repo.create(new_link(owner_id, "dup123")).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_find_by_token_is_case_sensitive(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    common::create_pg_link(&pool, owner_id, "MiXeD1", "https://example.com/").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(repo.find_by_token("MiXeD1").await.unwrap().is_some());
    assert!(repo.find_by_token("mixed1").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_list_and_count_by_owner(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    let other_id = common::create_pg_token(&pool, "other").await;
    for i in 0..3 {
        common::create_pg_link(&pool, owner_id, &format!("own{i}"), "https://example.com/").await;
    }
    common::create_pg_link(&pool, other_id, "foreign", "https://example.com/").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    let page = repo.list_by_owner(owner_id, 1, 2).await.unwrap();
    let tokens: Vec<_> = page.iter().map(|l| l.short_token.as_str()).collect();
    assert_eq!(tokens, vec!["own2", "own1"]);

    let page = repo.list_by_owner(owner_id, 2, 2).await.unwrap();
    assert_eq!(page.len(), 1);

    assert_eq!(repo.count_by_owner(owner_id).await.unwrap(), 3);
    assert_eq!(repo.recent_by_owner(owner_id, 10).await.unwrap().len(), 3);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_increment_clicks(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    let link_id = common::create_pg_link(&pool, owner_id, "count1", "https://example.com/").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    repo.increment_clicks(link_id).await.unwrap();
    repo.increment_clicks(link_id).await.unwrap();

    let link = repo.find_by_id(link_id).await.unwrap().unwrap();
    assert_eq!(link.clicks, 2);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_concurrent_increments_are_not_lost(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    let link_id = common::create_pg_link(&pool, owner_id, "race01", "https://example.com/").await;
    let repo = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_clicks(link_id).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let link = repo.find_by_id(link_id).await.unwrap().unwrap();
    assert_eq!(link.clicks, 20);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_increment_missing_link_is_not_found(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));

    let result = repo.increment_clicks(999_999).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_delete_checks_owner(pool: PgPool) {
    let owner_id = common::create_pg_token(&pool, "owner").await;
    let other_id = common::create_pg_token(&pool, "other").await;
    let link_id = common::create_pg_link(&pool, owner_id, "del123", "https://example.com/").await;
    let repo = PgLinkRepository::new(Arc::new(pool));

    assert!(!repo.delete(link_id, other_id).await.unwrap());
    assert!(repo.delete(link_id, owner_id).await.unwrap());
    assert!(repo.find_by_id(link_id).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_ping(pool: PgPool) {
    let repo = PgLinkRepository::new(Arc::new(pool));
    assert!(repo.ping().await.is_ok());
}
