//! Operator CLI for link-shortener.
//!
//! Talks to PostgreSQL directly, so it works while the HTTP server is down
//! and needs no API token of its own.
//!
//! ```bash
//! # API tokens (each token owns the links created with it)
//! cargo run --bin admin -- token create --name "Marketing site"
//! cargo run --bin admin -- token list
//! cargo run --bin admin -- token revoke "Marketing site"
//!
//! # Links and their redirect rules
//! cargo run --bin admin -- link list --owner "Marketing site"
//! cargo run --bin admin -- link show abc123
//! cargo run --bin admin -- link explain abc123 -H "X-Country: DE" -c ref=summer-promo
//!
//! cargo run --bin admin -- stats
//! cargo run --bin admin -- db check
//! ```
//!
//! Reads the same environment as the server (see `link_shortener::config`).
//! `TOKEN_SIGNING_SECRET` must match the server's, or created tokens will not
//! authenticate.

use link_shortener::application::services::auth_service::hash_token;
use link_shortener::config;
use link_shortener::domain::entities::{RedirectRule, TargetType};
use link_shortener::domain::repositories::{
    ApiToken, ClickRepository, DateRange, LinkRepository, RedirectRuleRepository, TokenRepository,
};
use link_shortener::domain::request_context::RequestContext;
use link_shortener::domain::rule_selector::select;
use link_shortener::infrastructure::persistence::{
    PgClickRepository, PgLinkRepository, PgRedirectRuleRepository, PgTokenRepository,
};

use anyhow::{Context, Result, bail};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header::COOKIE};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage API tokens (link owners)
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Inspect short links and their redirect rules
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show service-wide statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Token name, unique across tokens
        #[arg(short, long)]
        name: Option<String>,

        /// Use this raw token value instead of a generated one
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List tokens with the links they own
    List,

    /// Revoke a token by name or id
    Revoke { name_or_id: String },
}

#[derive(Subcommand)]
enum LinkAction {
    /// List links, newest first
    List {
        /// Only links owned by this token (name or id)
        #[arg(short, long)]
        owner: Option<String>,

        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },

    /// Show a link, its rules in evaluation order and recent traffic
    Show { short_token: String },

    /// Dry-run rule selection for a request without recording a click
    Explain {
        short_token: String,

        /// Request header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Cookie as "name=value" (repeatable)
        #[arg(short, long = "cookie")]
        cookies: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show server version and applied migrations
    Info,
}

/// A token joined with the links it owns.
#[derive(sqlx::FromRow)]
struct TokenUsageRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
    links: i64,
    clicks: i64,
}

#[derive(sqlx::FromRow)]
struct LinkListRow {
    short_token: String,
    original_url: String,
    owner: String,
    clicks: i64,
    rules: i64,
    created_at: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => {
            handle_token_action(action, &pool, &config.token_signing_secret, &config.base_url)
                .await?
        }
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_token_action(
    action: TokenAction,
    pool: &PgPool,
    signing_secret: &str,
    base_url: &str,
) -> Result<()> {
    let repo = PgTokenRepository::new(Arc::new(pool.clone()));

    match action {
        TokenAction::Create { name, token, yes } => {
            create_token(&repo, signing_secret, base_url, name, token, yes).await
        }
        TokenAction::List => list_tokens(pool).await,
        TokenAction::Revoke { name_or_id } => revoke_token(&repo, pool, &name_or_id).await,
    }
}

/// Creates a token. Only its HMAC is stored, so the raw value is shown once.
async fn create_token(
    repo: &PgTokenRepository,
    signing_secret: &str,
    base_url: &str,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .interact_text()?,
    };

    if repo.find_by_name(&token_name).await?.is_some() {
        bail!("A token named {token_name:?} already exists");
    }

    let token_value = token.unwrap_or_else(generate_token);

    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  Save this token now, it cannot be shown again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm
        && !Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?
    {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let created = repo
        .create_token(&token_name, &hash_token(signing_secret, &token_value))
        .await
        .context("Failed to create token")?;

    println!();
    println!(
        "{} (owner id {})",
        "✅ Token created".green().bold(),
        created.id.to_string().bright_white()
    );
    println!();
    println!("  Shorten a URL with it:");
    println!(
        "  curl -X POST {}/api/links \\\n    -H \"Authorization: Bearer {}\" \\\n    -H \"Content-Type: application/json\" \\\n    -d '{{\"url\": \"https://example.com\"}}'",
        base_url.trim_end_matches('/'),
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists tokens with how many links each owns and how often those were hit.
async fn list_tokens(pool: &PgPool) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let rows: Vec<TokenUsageRow> = sqlx::query_as(
        r#"
        SELECT t.id, t.name, t.created_at, t.last_used_at, t.revoked_at,
               COUNT(l.id) AS links,
               COALESCE(SUM(l.clicks), 0)::BIGINT AS clicks
        FROM api_tokens t
        LEFT JOIN links l ON l.owner_id = t.id
        GROUP BY t.id
        ORDER BY t.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    if rows.is_empty() {
        println!("{}", "  No tokens yet".yellow());
        println!("  Create one with: cargo run --bin admin -- token create");
        return Ok(());
    }

    println!(
        "  {:<4} {:<26} {:>6} {:>9}  {:<17} {:<17} {}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Links".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(96).bright_black());

    for row in &rows {
        let status = if row.revoked_at.is_some() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<4} {:<26} {:>6} {:>9}  {:<17} {:<17} {}",
            row.id.to_string().bright_black(),
            truncate(&row.name, 26).cyan(),
            row.links,
            row.clicks,
            format_time(row.created_at).bright_black(),
            row.last_used_at
                .map(format_time)
                .unwrap_or_else(|| "never".to_string())
                .bright_black(),
            status
        );
    }
    println!();

    Ok(())
}

/// Revokes a token. Its links keep redirecting but can no longer be managed.
async fn revoke_token(repo: &PgTokenRepository, pool: &PgPool, name_or_id: &str) -> Result<()> {
    println!("{}", "🔒 Revoke API Token".bright_blue().bold());
    println!();

    let token = find_token(repo, name_or_id).await?;

    if !token.is_active() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    let owned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE owner_id = $1")
        .bind(token.id)
        .fetch_one(pool)
        .await?;

    println!("  Token: {} (id {})", token.name.cyan(), token.id);
    println!("  Owns:  {} link(s)", owned.to_string().bright_white());
    if owned > 0 {
        println!(
            "  {}",
            "These links keep redirecting but nobody can manage them afterwards.".yellow()
        );
    }
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke_token(token.id)
        .await
        .context("Failed to revoke token")?;

    println!("{}", "✅ Token revoked".green().bold());
    Ok(())
}

async fn find_token(repo: &PgTokenRepository, name_or_id: &str) -> Result<ApiToken> {
    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await?,
        Err(_) => repo.find_by_name(name_or_id).await?,
    };

    token.with_context(|| format!("Token {name_or_id:?} not found"))
}

async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    match action {
        LinkAction::List { owner, limit } => list_links(pool, owner.as_deref(), limit).await,
        LinkAction::Show { short_token } => show_link(pool, &short_token).await,
        LinkAction::Explain {
            short_token,
            headers,
            cookies,
        } => explain_link(pool, &short_token, &headers, &cookies).await,
    }
}

async fn list_links(pool: &PgPool, owner: Option<&str>, limit: i64) -> Result<()> {
    let owner_id = match owner {
        Some(owner) => {
            let tokens = PgTokenRepository::new(Arc::new(pool.clone()));
            Some(find_token(&tokens, owner).await?.id)
        }
        None => None,
    };

    let rows: Vec<LinkListRow> = sqlx::query_as(
        r#"
        SELECT l.short_token, l.original_url, t.name AS owner, l.clicks,
               COUNT(r.id) AS rules, l.created_at
        FROM links l
        JOIN api_tokens t ON t.id = l.owner_id
        LEFT JOIN redirect_rules r ON r.link_id = l.id
        WHERE ($1::BIGINT IS NULL OR l.owner_id = $1)
        GROUP BY l.id, t.name
        ORDER BY l.id DESC
        LIMIT $2
        "#,
    )
    .bind(owner_id)
    .bind(limit.max(1))
    .fetch_all(pool)
    .await?;

    println!("{}", "🔗 Links".bright_blue().bold());
    println!();

    if rows.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<14} {:<18} {:>8} {:>6}  {:<17} {}",
        "Token".bright_white().bold(),
        "Owner".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Rules".bright_white().bold(),
        "Created".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(100).bright_black());

    for row in &rows {
        println!(
            "  {:<14} {:<18} {:>8} {:>6}  {:<17} {}",
            row.short_token.cyan(),
            truncate(&row.owner, 18),
            row.clicks,
            row.rules,
            format_time(row.created_at).bright_black(),
            truncate(&row.original_url, 60)
        );
    }
    println!();

    Ok(())
}

async fn show_link(pool: &PgPool, short_token: &str) -> Result<()> {
    let db = Arc::new(pool.clone());
    let links = PgLinkRepository::new(db.clone());
    let rules = PgRedirectRuleRepository::new(db.clone());
    let clicks = PgClickRepository::new(db.clone());
    let tokens = PgTokenRepository::new(db);

    let link = links
        .find_by_token(short_token)
        .await?
        .with_context(|| format!("Short link {short_token:?} not found"))?;
    let owner = tokens
        .find_by_id(link.owner_id)
        .await?
        .map(|t| t.name)
        .unwrap_or_else(|| format!("#{}", link.owner_id));

    println!("{}", format!("🔗 {}", link.short_url).bright_blue().bold());
    println!();
    println!("  Destination: {}", link.original_url);
    println!("  Owner:       {}", owner.cyan());
    println!("  Created:     {}", format_time(link.created_at));
    println!("  Clicks:      {}", link.clicks.to_string().bright_green().bold());
    println!();

    let ordered = evaluation_order(rules.list_by_link(link.id).await?);
    println!("{}", "Rules (evaluation order)".bright_white().bold());
    if ordered.is_empty() {
        println!("  {}", "none, every visitor goes to the destination".bright_black());
    }
    for (position, rule) in ordered.iter().enumerate() {
        println!("  {:>2}. {}", position + 1, describe_rule(rule));
    }
    println!();

    let week = DateRange::new(Some(Utc::now() - Duration::days(7)), None);
    let recent = clicks.count_clicks(link.id, week).await?;
    println!(
        "{} {}",
        "Clicks in the last 7 days:".bright_white().bold(),
        recent
    );
    for group in clicks.device_counts(link.id, week).await? {
        println!(
            "  {:<10} {}",
            group.key.unwrap_or_else(|| "unknown".to_string()),
            group.clicks
        );
    }
    println!();

    Ok(())
}

/// Runs the redirect rule selection for a synthetic request and prints the
/// outcome. Nothing is written.
async fn explain_link(
    pool: &PgPool,
    short_token: &str,
    header_args: &[String],
    cookie_args: &[String],
) -> Result<()> {
    let db = Arc::new(pool.clone());
    let links = PgLinkRepository::new(db.clone());
    let rules = PgRedirectRuleRepository::new(db);

    let link = links
        .find_by_token(short_token)
        .await?
        .with_context(|| format!("Short link {short_token:?} not found"))?;
    let rules = rules.list_by_link(link.id).await?;

    let ctx = RequestContext::new(build_headers(header_args, cookie_args)?, None);

    println!("{}", format!("🧭 Explain /{short_token}").bright_blue().bold());
    println!();
    println!("  Rules checked: {}", rules.len());

    match select(&rules, &ctx.headers, &ctx.cookies) {
        Some(rule) => {
            println!("  Matched:       {}", describe_rule(rule));
            println!("  Redirect to:   {}", rule.redirect_url.bright_green().bold());
        }
        None => {
            println!("  Matched:       {}", "no rule".bright_black());
            println!("  Redirect to:   {}", link.original_url.bright_green().bold());
        }
    }
    println!();

    Ok(())
}

/// Builds a request header map from `Name: value` and `name=value` arguments.
fn build_headers(header_args: &[String], cookie_args: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for arg in header_args {
        let Some((name, value)) = arg.split_once(':') else {
            bail!("Header {arg:?} must look like \"Name: value\"");
        };
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("Invalid header name in {arg:?}"))?;
        let value = HeaderValue::from_bytes(value.trim().as_bytes())
            .with_context(|| format!("Invalid header value in {arg:?}"))?;
        headers.append(name, value);
    }

    for arg in cookie_args {
        if !arg.contains('=') {
            bail!("Cookie {arg:?} must look like \"name=value\"");
        }
        let value = HeaderValue::from_bytes(arg.trim().as_bytes())
            .with_context(|| format!("Invalid cookie {arg:?}"))?;
        headers.append(COOKIE, value);
    }

    Ok(headers)
}

/// Header rules first, then cookie rules, each in storage order.
fn evaluation_order(rules: Vec<RedirectRule>) -> Vec<RedirectRule> {
    let (mut ordered, cookies): (Vec<_>, Vec<_>) = rules
        .into_iter()
        .partition(|rule| rule.target_type == TargetType::Header);
    ordered.extend(cookies);
    ordered
}

fn describe_rule(rule: &RedirectRule) -> String {
    let condition = match rule.predicate() {
        Some((name, value)) => format!(
            "{} {:?} {} {:?}",
            rule.target_type.as_str(),
            name,
            rule.method.as_str(),
            value
        ),
        None => format!("{} (incomplete, never matches)", rule.target_type.as_str()),
    };

    format!("#{} {} → {}", rule.id, condition, rule.redirect_url)
}

/// Displays service-wide totals, recent traffic and the busiest links.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, counted_clicks, rules, active_tokens): (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT (SELECT COUNT(*) FROM links),
               (SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM links),
               (SELECT COUNT(*) FROM redirect_rules),
               (SELECT COUNT(*) FROM api_tokens WHERE revoked_at IS NULL)
        "#,
    )
    .fetch_one(pool)
    .await?;

    let last_day: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM clicks WHERE clicked_at >= NOW() - INTERVAL '1 day'")
            .fetch_one(pool)
            .await?;

    println!("  Links:           {}", links.to_string().bright_green().bold());
    println!("  Redirects:       {}", counted_clicks.to_string().bright_green().bold());
    println!("  Last 24 hours:   {}", last_day.to_string().bright_green().bold());
    println!("  Redirect rules:  {}", rules.to_string().bright_green().bold());
    println!("  Active tokens:   {}", active_tokens.to_string().bright_green().bold());
    println!();

    let top: Vec<(String, i64, String)> = sqlx::query_as(
        "SELECT short_token, clicks, original_url FROM links ORDER BY clicks DESC, id LIMIT 5",
    )
    .fetch_all(pool)
    .await?;

    if !top.is_empty() {
        println!("{}", "Top links".bright_white().bold());
        for (short_token, clicks, url) in top {
            println!(
                "  {:<14} {:>8}  {}",
                short_token.cyan(),
                clicks,
                truncate(&url, 60).bright_black()
            );
        }
        println!();
    }

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());
            PgLinkRepository::new(Arc::new(pool.clone()))
                .ping()
                .await
                .context("Database ping failed")?;
            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            // The table is missing until the server has run once.
            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a 48-character alphanumeric token.
fn generate_token() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    const TOKEN_LEN: usize = 48;

    let mut rng = rand::rng();

    (0..TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn format_time(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
