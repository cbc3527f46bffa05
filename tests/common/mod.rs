#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::Layer;

use link_shortener::application::services::auth_service::hash_token;
use link_shortener::domain::entities::{
    Click, Link, MatchMethod, NewClick, NewLink, NewRedirectRule, RedirectRule, RuleDefinition,
    TargetType,
};
use link_shortener::domain::repositories::{
    ApiToken, ClickFilter, ClickRepository, DailyCount, DateRange, GroupCount, LinkRepository,
    OwnerTotals, RedirectRuleRepository, TokenRepository,
};
use link_shortener::error::AppError;
use link_shortener::infrastructure::cache::NullCache;
use link_shortener::routes::router;
use link_shortener::state::{AppState, Repositories};

pub const SIGNING_SECRET: &str = "test-signing-secret";
pub const BASE_URL: &str = "https://sho.rt";

// ── ConnectInfo injection ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

// ── In-memory repositories ──────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
    links: Vec<Link>,
    clicks: Vec<Click>,
    rules: Vec<RedirectRule>,
    tokens: Vec<ApiToken>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Implements every repository trait over shared vectors.
///
/// Ids are allocated from one sequence, so a link and a rule never share an id.
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
    pub fail_increment: AtomicBool,
    pub fail_rules: AtomicBool,
    pub fail_click_insert: AtomicBool,
}

fn db_down() -> AppError {
    AppError::internal("Database error", json!({}))
}

impl InMemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            links: self.clone(),
            clicks: self.clone(),
            rules: self.clone(),
            tokens: self.clone(),
        }
    }

    /// Stores a token and returns `(owner_id, raw_token)`.
    pub fn issue_token(&self, name: &str) -> (i64, String) {
        let raw = format!("raw-{name}-token");
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        t.tokens.push(ApiToken {
            id,
            name: name.to_string(),
            token_hash: hash_token(SIGNING_SECRET, &raw),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        });
        (id, raw)
    }

    pub fn revoke(&self, token_id: i64) {
        let mut t = self.tables.lock().unwrap();
        if let Some(token) = t.tokens.iter_mut().find(|t| t.id == token_id) {
            token.revoked_at = Some(Utc::now());
        }
    }

    pub fn insert_link(&self, owner_id: i64, short_token: &str, original_url: &str) -> Link {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let link = Link::new(
            id,
            short_token.to_string(),
            original_url.to_string(),
            format!("{BASE_URL}/{short_token}"),
            owner_id,
            Utc::now(),
            0,
        );
        t.links.push(link.clone());
        link
    }

    pub fn insert_rule(
        &self,
        link_id: i64,
        target_type: TargetType,
        name: &str,
        method: MatchMethod,
        value: &str,
        redirect_url: &str,
    ) -> RedirectRule {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let rule = RedirectRule {
            id,
            link_id,
            target_type,
            target_name: Some(name.to_string()),
            method,
            target_value: Some(value.to_string()),
            redirect_url: redirect_url.to_string(),
        };
        t.rules.push(rule.clone());
        rule
    }

    pub fn insert_click_at(&self, link_id: i64, clicked_at: DateTime<Utc>, referer: Option<&str>) {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        t.clicks.push(Click {
            id,
            link_id,
            clicked_at,
            user_agent: None,
            referer: referer.map(str::to_string),
            ip: Some("127.0.0.1".to_string()),
            country: None,
            device: link_shortener::domain::entities::DeviceType::Other,
        });
    }

    pub fn link(&self, link_id: i64) -> Option<Link> {
        let t = self.tables.lock().unwrap();
        t.links.iter().find(|l| l.id == link_id).cloned()
    }

    pub fn clicks_for(&self, link_id: i64) -> Vec<Click> {
        let t = self.tables.lock().unwrap();
        t.clicks.iter().filter(|c| c.link_id == link_id).cloned().collect()
    }

    pub fn click_count(&self) -> usize {
        self.tables.lock().unwrap().clicks.len()
    }

    fn filtered_clicks(&self, link_id: i64, range: DateRange) -> Vec<Click> {
        let t = self.tables.lock().unwrap();
        t.clicks
            .iter()
            .filter(|c| c.link_id == link_id && range.contains(c.clicked_at))
            .cloned()
            .collect()
    }

    fn group(
        &self,
        link_id: i64,
        range: DateRange,
        key: impl Fn(&Click) -> Option<String>,
    ) -> Vec<GroupCount> {
        let mut groups: BTreeMap<Option<String>, i64> = BTreeMap::new();
        for click in self.filtered_clicks(link_id, range) {
            *groups.entry(key(&click)).or_default() += 1;
        }

        let mut items: Vec<GroupCount> = groups
            .into_iter()
            .map(|(key, clicks)| GroupCount { key, clicks })
            .collect();
        items.sort_by(|a, b| {
            b.clicks
                .cmp(&a.clicks)
                .then_with(|| match (&a.key, &b.key) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
        });
        items
    }
}

fn daily(clicks: impl Iterator<Item = DateTime<Utc>>) -> Vec<DailyCount> {
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for at in clicks {
        *days.entry(at.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(day, clicks)| DailyCount { day, clicks })
        .collect()
}

#[async_trait]
impl LinkRepository for InMemoryDb {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut t = self.tables.lock().unwrap();
        if t.links.iter().any(|l| l.short_token == new_link.short_token) {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "constraint": "links_short_token_key" }),
            ));
        }
        let id = t.next_id();
        let link = Link::new(
            id,
            new_link.short_token,
            new_link.original_url,
            new_link.short_url,
            new_link.owner_id,
            Utc::now(),
            0,
        );
        t.links.push(link.clone());
        Ok(link)
    }

    async fn find_by_token(&self, short_token: &str) -> Result<Option<Link>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.links.iter().find(|l| l.short_token == short_token).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.link(id))
    }

    async fn list_by_owner(
        &self,
        owner_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Link>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut links: Vec<Link> = t
            .links
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(links
            .into_iter()
            .skip(((page - 1) * page_size) as usize)
            .take(page_size as usize)
            .collect())
    }

    async fn recent_by_owner(&self, owner_id: i64, limit: i64) -> Result<Vec<Link>, AppError> {
        let t = self.tables.lock().unwrap();
        let mut links: Vec<Link> = t
            .links
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        links.truncate(limit as usize);
        Ok(links)
    }

    async fn count_by_owner(&self, owner_id: i64) -> Result<i64, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.links.iter().filter(|l| l.owner_id == owner_id).count() as i64)
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.links.len();
        t.links.retain(|l| !(l.id == id && l.owner_id == owner_id));
        let deleted = t.links.len() < before;
        if deleted {
            t.clicks.retain(|c| c.link_id != id);
            t.rules.retain(|r| r.link_id != id);
        }
        Ok(deleted)
    }

    async fn increment_clicks(&self, link_id: i64) -> Result<(), AppError> {
        if self.fail_increment.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let mut t = self.tables.lock().unwrap();
        match t.links.iter_mut().find(|l| l.id == link_id) {
            Some(link) => {
                link.clicks += 1;
                Ok(())
            }
            None => Err(AppError::not_found(
                "Short link not found",
                json!({ "id": link_id }),
            )),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl ClickRepository for InMemoryDb {
    async fn create_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        if self.fail_click_insert.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let mut t = self.tables.lock().unwrap();
        if !t.links.iter().any(|l| l.id == new_click.link_id) {
            return Err(AppError::bad_request(
                "Referenced record does not exist",
                json!({ "constraint": "clicks_link_id_fkey" }),
            ));
        }
        let id = t.next_id();
        let click = Click {
            id,
            link_id: new_click.link_id,
            clicked_at: new_click.clicked_at,
            user_agent: new_click.user_agent,
            referer: new_click.referer,
            ip: new_click.ip,
            country: new_click.country,
            device: new_click.device,
        };
        t.clicks.push(click.clone());
        Ok(click)
    }

    async fn list_clicks(&self, link_id: i64, filter: ClickFilter) -> Result<Vec<Click>, AppError> {
        let mut clicks = self.filtered_clicks(link_id, filter.range);
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        Ok(clicks
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count_clicks(&self, link_id: i64, range: DateRange) -> Result<i64, AppError> {
        Ok(self.filtered_clicks(link_id, range).len() as i64)
    }

    async fn daily_counts_for_link(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError> {
        Ok(daily(
            self.filtered_clicks(link_id, range)
                .into_iter()
                .map(|c| c.clicked_at),
        ))
    }

    async fn daily_counts_for_owner(
        &self,
        owner_id: i64,
        range: DateRange,
    ) -> Result<Vec<DailyCount>, AppError> {
        let t = self.tables.lock().unwrap();
        let owned: Vec<i64> = t
            .links
            .iter()
            .filter(|l| l.owner_id == owner_id)
            .map(|l| l.id)
            .collect();
        Ok(daily(
            t.clicks
                .iter()
                .filter(|c| owned.contains(&c.link_id) && range.contains(c.clicked_at))
                .map(|c| c.clicked_at),
        ))
    }

    async fn device_counts(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError> {
        Ok(self.group(link_id, range, |c| Some(c.device.as_str().to_string())))
    }

    async fn referer_counts(
        &self,
        link_id: i64,
        range: DateRange,
    ) -> Result<Vec<GroupCount>, AppError> {
        Ok(self.group(link_id, range, |c| c.referer.clone()))
    }

    async fn ip_counts(&self, link_id: i64, range: DateRange) -> Result<Vec<GroupCount>, AppError> {
        Ok(self.group(link_id, range, |c| c.ip.clone()))
    }

    async fn totals_for_owner(&self, owner_id: i64) -> Result<OwnerTotals, AppError> {
        let t = self.tables.lock().unwrap();
        let owned = t.links.iter().filter(|l| l.owner_id == owner_id);
        Ok(OwnerTotals {
            total_links: owned.clone().count() as i64,
            total_clicks: owned.map(|l| l.clicks).sum(),
        })
    }
}

#[async_trait]
impl RedirectRuleRepository for InMemoryDb {
    async fn create(&self, new_rule: NewRedirectRule) -> Result<RedirectRule, AppError> {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let def = new_rule.definition;
        let rule = RedirectRule {
            id,
            link_id: new_rule.link_id,
            target_type: def.target_type,
            target_name: def.target_name,
            method: def.method,
            target_value: def.target_value,
            redirect_url: def.redirect_url,
        };
        t.rules.push(rule.clone());
        Ok(rule)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<RedirectRule>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.rules.iter().find(|r| r.id == id).cloned())
    }

    async fn list_by_link(&self, link_id: i64) -> Result<Vec<RedirectRule>, AppError> {
        if self.fail_rules.load(Ordering::SeqCst) {
            return Err(db_down());
        }
        let t = self.tables.lock().unwrap();
        let mut rules: Vec<RedirectRule> = t
            .rules
            .iter()
            .filter(|r| r.link_id == link_id)
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.id);
        Ok(rules)
    }

    async fn update(&self, id: i64, definition: RuleDefinition) -> Result<RedirectRule, AppError> {
        let mut t = self.tables.lock().unwrap();
        let rule = t
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::not_found("Redirect rule not found", json!({ "id": id })))?;
        rule.target_type = definition.target_type;
        rule.target_name = definition.target_name;
        rule.method = definition.method;
        rule.target_value = definition.target_value;
        rule.redirect_url = definition.redirect_url;
        Ok(rule.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables.lock().unwrap();
        let before = t.rules.len();
        t.rules.retain(|r| r.id != id);
        Ok(t.rules.len() < before)
    }
}

#[async_trait]
impl TokenRepository for InMemoryDb {
    async fn validate_token(&self, token_hash: &str) -> Result<Option<i64>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.tokens
            .iter()
            .find(|tok| tok.token_hash == token_hash && tok.is_active())
            .map(|tok| tok.id))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), AppError> {
        let mut t = self.tables.lock().unwrap();
        if let Some(tok) = t.tokens.iter_mut().find(|tok| tok.token_hash == token_hash) {
            tok.last_used_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, AppError> {
        let mut t = self.tables.lock().unwrap();
        let id = t.next_id();
        let token = ApiToken {
            id,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        };
        t.tokens.push(token.clone());
        Ok(token)
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, AppError> {
        Ok(self.tables.lock().unwrap().tokens.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.tokens.iter().find(|tok| tok.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, AppError> {
        let t = self.tables.lock().unwrap();
        Ok(t.tokens.iter().find(|tok| tok.name == name).cloned())
    }

    async fn revoke_token(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables.lock().unwrap();
        match t.tokens.iter_mut().find(|tok| tok.id == id) {
            Some(token) => {
                token.revoked_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AppError::not_found("Token not found", json!({ "id": id }))),
        }
    }
}

// ── Test application ────────────────────────────────────────────────────────

/// A running router over an [`InMemoryDb`] with one issued API token.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<InMemoryDb>,
    pub owner_id: i64,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_proxy(false)
    }

    pub fn with_proxy(behind_proxy: bool) -> Self {
        let db = InMemoryDb::new();
        let (owner_id, token) = db.issue_token("primary");

        let server = TestServer::new(build_app(db.repositories(), behind_proxy)).unwrap();

        Self {
            server,
            db,
            owner_id,
            token,
        }
    }

    /// `Authorization` header value for the primary token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn build_state(repos: Repositories, behind_proxy: bool) -> AppState {
    AppState::new(
        repos,
        Arc::new(NullCache::new()),
        BASE_URL.to_string(),
        SIGNING_SECRET.to_string(),
        behind_proxy,
    )
}

pub fn build_app(repos: Repositories, behind_proxy: bool) -> Router {
    router(build_state(repos, behind_proxy), false).layer(MockConnectInfoLayer)
}

// ── PostgreSQL fixtures ─────────────────────────────────────────────────────

pub async fn create_pg_token(pool: &PgPool, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO api_tokens (name, token_hash) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(hash_token(SIGNING_SECRET, name))
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_pg_link(pool: &PgPool, owner_id: i64, short_token: &str, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (short_token, original_url, short_url, owner_id) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(short_token)
    .bind(url)
    .bind(format!("{BASE_URL}/{short_token}"))
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .unwrap()
}
