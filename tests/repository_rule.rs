mod common;

use link_shortener::domain::entities::{MatchMethod, NewRedirectRule, RuleDefinition, TargetType};
use link_shortener::domain::repositories::RedirectRuleRepository;
use link_shortener::error::AppError;
use link_shortener::infrastructure::persistence::PgRedirectRuleRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn definition(target_type: TargetType, method: MatchMethod, url: &str) -> RuleDefinition {
    RuleDefinition {
        target_type,
        target_name: Some("X-Tier".to_string()),
        method,
        target_value: Some("gold".to_string()),
        redirect_url: url.to_string(),
    }
}

async fn link(pool: &PgPool) -> i64 {
    let owner_id = common::create_pg_token(pool, "owner").await;
    common::create_pg_link(pool, owner_id, "rules1", "https://example.com/").await
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_create_and_list_in_order(pool: PgPool) {
    let link_id = link(&pool).await;
    let repo = PgRedirectRuleRepository::new(Arc::new(pool));

    let first = repo
        .create(NewRedirectRule {
            link_id,
            definition: definition(TargetType::Cookie, MatchMethod::EndsWith, "https://a.example/"),
        })
        .await
        .unwrap();
    let second = repo
        .create(NewRedirectRule {
            link_id,
            definition: definition(TargetType::Header, MatchMethod::StartsWith, "https://b.example/"),
        })
        .await
        .unwrap();

    let rules = repo.list_by_link(link_id).await.unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0], first);
    assert_eq!(rules[1], second);
    assert_eq!(rules[1].method, MatchMethod::StartsWith);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_incomplete_rule_is_stored(pool: PgPool) {
    let link_id = link(&pool).await;
    let repo = PgRedirectRuleRepository::new(Arc::new(pool));

    let rule = repo
        .create(NewRedirectRule {
            link_id,
            definition: RuleDefinition {
                target_name: None,
                target_value: None,
                ..definition(TargetType::Header, MatchMethod::Match, "https://a.example/")
            },
        })
        .await
        .unwrap();

    assert!(rule.predicate().is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_update_and_delete(pool: PgPool) {
    let link_id = link(&pool).await;
    let repo = PgRedirectRuleRepository::new(Arc::new(pool));
    let rule = repo
        .create(NewRedirectRule {
            link_id,
            definition: definition(TargetType::Header, MatchMethod::Match, "https://a.example/"),
        })
        .await
        .unwrap();

    let updated = repo
        .update(
            rule.id,
            definition(TargetType::Cookie, MatchMethod::Regex, "https://c.example/"),
        )
        .await
        .unwrap();
    assert_eq!(updated.id, rule.id);
    assert_eq!(updated.target_type, TargetType::Cookie);
    assert_eq!(updated.redirect_url, "https://c.example/");

    assert!(repo.delete(rule.id).await.unwrap());
    assert!(!repo.delete(rule.id).await.unwrap());
    assert!(repo.find_by_id(rule.id).await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_update_missing_rule_is_not_found(pool: PgPool) {
    let repo = PgRedirectRuleRepository::new(Arc::new(pool));

    let result = repo
        .update(
            31_337,
            definition(TargetType::Header, MatchMethod::Match, "https://a.example/"),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL instance (DATABASE_URL)"]
async fn test_rules_cascade_with_link(pool: PgPool) {
    let link_id = link(&pool).await;
    let repo = PgRedirectRuleRepository::new(Arc::new(pool.clone()));
    repo.create(NewRedirectRule {
        link_id,
        definition: definition(TargetType::Header, MatchMethod::Match, "https://a.example/"),
    })
    .await
    .unwrap();

    sqlx::query("DELETE FROM links WHERE id = $1")
        .bind(link_id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(repo.list_by_link(link_id).await.unwrap().is_empty());
}
