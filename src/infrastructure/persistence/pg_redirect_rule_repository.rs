//! PostgreSQL implementation of redirect rule repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewRedirectRule, RedirectRule, RuleDefinition};
use crate::domain::repositories::RedirectRuleRepository;
use crate::error::AppError;

const RULE_COLUMNS: &str =
    "id, link_id, target_type, target_name, target_method, target_value, redirect_url";

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: i64,
    link_id: i64,
    target_type: String,
    target_name: Option<String>,
    target_method: String,
    target_value: Option<String>,
    redirect_url: String,
}

impl TryFrom<RuleRow> for RedirectRule {
    type Error = AppError;

    fn try_from(r: RuleRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::domain::entities::UnknownTag| {
            tracing::error!(rule_id = r.id, error = %e, "Stored redirect rule has an unknown tag");
            AppError::internal("Corrupt redirect rule", json!({ "id": r.id }))
        };

        Ok(RedirectRule {
            id: r.id,
            link_id: r.link_id,
            target_type: r.target_type.parse().map_err(corrupt)?,
            target_name: r.target_name,
            method: r.target_method.parse().map_err(corrupt)?,
            target_value: r.target_value,
            redirect_url: r.redirect_url,
        })
    }
}

/// PostgreSQL repository for redirect rules.
///
/// Type and method are stored as their wire tags (`header`, `startsWith`, ...).
pub struct PgRedirectRuleRepository {
    pool: Arc<PgPool>,
}

impl PgRedirectRuleRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RedirectRuleRepository for PgRedirectRuleRepository {
    async fn create(&self, new_rule: NewRedirectRule) -> Result<RedirectRule, AppError> {
        let def = new_rule.definition;

        let row = sqlx::query_as::<_, RuleRow>(&format!(
            r#"
            INSERT INTO redirect_rules
                (link_id, target_type, target_name, target_method, target_value, redirect_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {RULE_COLUMNS}
            "#
        ))
        .bind(new_rule.link_id)
        .bind(def.target_type.as_str())
        .bind(&def.target_name)
        .bind(def.method.as_str())
        .bind(&def.target_value)
        .bind(&def.redirect_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RedirectRule>, AppError> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM redirect_rules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(RedirectRule::try_from).transpose()
    }

    async fn list_by_link(&self, link_id: i64) -> Result<Vec<RedirectRule>, AppError> {
        let rows = sqlx::query_as::<_, RuleRow>(&format!(
            "SELECT {RULE_COLUMNS} FROM redirect_rules WHERE link_id = $1 ORDER BY id"
        ))
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(RedirectRule::try_from).collect()
    }

    async fn update(&self, id: i64, definition: RuleDefinition) -> Result<RedirectRule, AppError> {
        let row = sqlx::query_as::<_, RuleRow>(&format!(
            r#"
            UPDATE redirect_rules
            SET target_type = $2,
                target_name = $3,
                target_method = $4,
                target_value = $5,
                redirect_url = $6
            WHERE id = $1
            RETURNING {RULE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(definition.target_type.as_str())
        .bind(&definition.target_name)
        .bind(definition.method.as_str())
        .bind(&definition.target_value)
        .bind(&definition.redirect_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.ok_or_else(|| AppError::not_found("Redirect rule not found", json!({ "id": id })))?
            .try_into()
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM redirect_rules WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
