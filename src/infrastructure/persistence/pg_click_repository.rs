//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, DeviceType, NewClick};
use crate::domain::repositories::{
    ClickFilter, ClickRepository, DailyCount, DateRange, GroupCount, OwnerTotals,
};
use crate::error::AppError;

const CLICK_COLUMNS: &str = "id, link_id, clicked_at, user_agent, referer, ip, country, device";

/// `clicked_at` window shared by every filtered query; `$2`/`$3` bind the
/// bounds.
const RANGE_PREDICATE: &str =
    "($2::timestamptz IS NULL OR clicked_at >= $2) AND ($3::timestamptz IS NULL OR clicked_at < $3)";

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    user_agent: Option<String>,
    referer: Option<String>,
    ip: Option<String>,
    country: Option<String>,
    device: String,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            clicked_at: r.clicked_at,
            user_agent: r.user_agent,
            referer: r.referer,
            ip: r.ip,
            country: r.country,
            device: DeviceType::from_db(&r.device),
        }
    }
}

#[derive(sqlx::FromRow)]
struct DailyRow {
    day: NaiveDate,
    clicks: i64,
}

#[derive(sqlx::FromRow)]
struct GroupRow {
    key: Option<String>,
    clicks: i64,
}

/// PostgreSQL repository for click records and analytics.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn group_by(
        &self,
        column: &'static str,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            SELECT {column} AS key, COUNT(*) AS clicks
            FROM clicks
            WHERE link_id = $1 AND {RANGE_PREDICATE}
            GROUP BY {column}
            ORDER BY clicks DESC, key ASC NULLS LAST
            "#
        ))
        .bind(link_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| GroupCount {
                key: r.key,
                clicks: r.clicks,
            })
            .collect())
    }
}

fn to_daily(rows: Vec<DailyRow>) -> Vec<DailyCount> {
    rows.into_iter()
        .map(|r| DailyCount {
            day: r.day,
            clicks: r.clicks,
        })
        .collect()
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn create_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(&format!(
            r#"
            INSERT INTO clicks (link_id, clicked_at, user_agent, referer, ip, country, device)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLICK_COLUMNS}
            "#
        ))
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.user_agent)
        .bind(&new_click.referer)
        .bind(&new_click.ip)
        .bind(&new_click.country)
        .bind(new_click.device.as_str())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_clicks(&self, link_id: i64, filter: ClickFilter) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(&format!(
            r#"
            SELECT {CLICK_COLUMNS}
            FROM clicks
            WHERE link_id = $1 AND {RANGE_PREDICATE}
            ORDER BY clicked_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(link_id)
        .bind(filter.range.from)
        .bind(filter.range.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn count_clicks(&self, link_id: i64, range: DateRange) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM clicks WHERE link_id = $1 AND {RANGE_PREDICATE}"
        ))
        .bind(link_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn daily_counts_for_link(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError> {
        let rows = sqlx::query_as::<_, DailyRow>(&format!(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS clicks
            FROM clicks
            WHERE link_id = $1 AND {RANGE_PREDICATE}
            GROUP BY day
            ORDER BY day
            "#
        ))
        .bind(link_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(to_daily(rows))
    }

    async fn daily_counts_for_owner(
        &self,
        owner_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError> {
        let rows = sqlx::query_as::<_, DailyRow>(&format!(
            r#"
            SELECT (c.clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS clicks
            FROM clicks c
            JOIN links l ON l.id = c.link_id
            WHERE l.owner_id = $1 AND {}
            GROUP BY day
            ORDER BY day
            "#,
            RANGE_PREDICATE.replace("clicked_at", "c.clicked_at")
        ))
        .bind(owner_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(to_daily(rows))
    }

    async fn device_counts(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError> {
        self.group_by("device", link_id, range).await
    }

    async fn referer_counts(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError> {
        self.group_by("referer", link_id, range).await
    }

    async fn ip_counts(&self, link_id: i64, range: DateRange) -> Result<Vec<GroupCount>, AppError> {
        self.group_by("ip", link_id, range).await
    }

    async fn totals_for_owner(&self, owner_id: i64) -> Result<OwnerTotals, AppError> {
        let (total_links, total_clicks): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(clicks), 0)::bigint
            FROM links
            WHERE owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(OwnerTotals {
            total_links,
            total_clicks,
        })
    }
}
