//! Short link resolution: lookup, click accounting and rule selection.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::application::services::click_recorder::{ClickMetadata, ClickRecorder};
use crate::domain::entities::LinkTarget;
use crate::domain::repositories::{ClickRepository, LinkRepository, RedirectRuleRepository};
use crate::domain::request_context::RequestContext;
use crate::domain::rule_selector;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Where a resolved request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// A redirect rule matched.
    Rule { rule_id: i64, url: String },
    /// No rule matched; the link's own destination.
    Original { url: String },
}

impl RedirectOutcome {
    /// Value for the `Location` header.
    pub fn location(&self) -> &str {
        match self {
            RedirectOutcome::Rule { url, .. } | RedirectOutcome::Original { url } => url,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RedirectOutcome::Rule { .. } => "rule",
            RedirectOutcome::Original { .. } => "original",
        }
    }
}

/// Failures that abort a resolution.
///
/// A failed click insert is not among them: it is logged and counted, and
/// the redirect proceeds.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("short link '{token}' not found")]
    LinkNotFound { token: String },
    #[error("link lookup failed: {0}")]
    LinkLookup(#[source] AppError),
    #[error("click count increment failed: {0}")]
    ClickCountIncrement(#[source] AppError),
    #[error("redirect rule retrieval failed: {0}")]
    RuleRetrieval(#[source] AppError),
}

impl ResolveError {
    fn kind(&self) -> &'static str {
        match self {
            ResolveError::LinkNotFound { .. } => "link_not_found",
            ResolveError::LinkLookup(_) => "link_lookup",
            ResolveError::ClickCountIncrement(_) => "click_count_increment",
            ResolveError::RuleRetrieval(_) => "rule_retrieval",
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::LinkNotFound { token } => {
                AppError::not_found("Short link not found", json!({ "short_token": token }))
            }
            ResolveError::LinkLookup(inner)
            | ResolveError::ClickCountIncrement(inner)
            | ResolveError::RuleRetrieval(inner) => inner,
        }
    }
}

/// Resolves short tokens to redirect destinations.
///
/// Per request: look the link up (cache first), then concurrently record a
/// click, increment the link's counter and load its rules. The first rule
/// selected over headers, then cookies, wins; otherwise the original URL.
pub struct RedirectService<L, R, C>
where
    L: LinkRepository + ?Sized,
    R: RedirectRuleRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    links: Arc<L>,
    rules: Arc<R>,
    recorder: ClickRecorder<C>,
    cache: Arc<dyn CacheService>,
}

impl<L, R, C> RedirectService<L, R, C>
where
    L: LinkRepository + ?Sized,
    R: RedirectRuleRepository + ?Sized,
    C: ClickRepository + ?Sized,
{
    pub fn new(
        links: Arc<L>,
        rules: Arc<R>,
        recorder: ClickRecorder<C>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            links,
            rules,
            recorder,
            cache,
        }
    }

    /// Resolves `short_token` for one inbound request.
    ///
    /// An unknown token has no side effects. Every known token produces
    /// exactly one click insert attempt and one counter increment.
    ///
    /// # Errors
    ///
    /// See [`ResolveError`].
    pub async fn resolve(
        &self,
        short_token: &str,
        ctx: &RequestContext,
    ) -> Result<RedirectOutcome, ResolveError> {
        match self.resolve_inner(short_token, ctx).await {
            Ok(outcome) => {
                metrics::counter!("redirects_total", "outcome" => outcome.label()).increment(1);
                Ok(outcome)
            }
            Err(e) => {
                metrics::counter!("redirect_errors_total", "kind" => e.kind()).increment(1);
                Err(e)
            }
        }
    }

    async fn resolve_inner(
        &self,
        short_token: &str,
        ctx: &RequestContext,
    ) -> Result<RedirectOutcome, ResolveError> {
        let target = self.lookup(short_token).await?;
        let link_id = target.link_id;

        let (recorded, incremented, rules) = tokio::join!(
            self.recorder.record(link_id, ClickMetadata::from(ctx)),
            self.links.increment_clicks(link_id),
            self.rules.list_by_link(link_id),
        );

        if let Err(e) = recorded {
            warn!(link_id, error = %e, "Failed to record click");
            metrics::counter!("click_record_failures_total").increment(1);
        }

        incremented.map_err(ResolveError::ClickCountIncrement)?;
        let rules = rules.map_err(ResolveError::RuleRetrieval)?;

        let outcome = match rule_selector::select(&rules, &ctx.headers, &ctx.cookies) {
            Some(rule) => {
                debug!(link_id, rule_id = rule.id, "Redirect rule matched");
                RedirectOutcome::Rule {
                    rule_id: rule.id,
                    url: rule.redirect_url.clone(),
                }
            }
            None => RedirectOutcome::Original {
                url: target.original_url,
            },
        };

        Ok(outcome)
    }

    /// Cache first; on a miss, the database, then a background cache fill.
    async fn lookup(&self, short_token: &str) -> Result<LinkTarget, ResolveError> {
        match self.cache.get_link(short_token).await {
            Ok(Some(target)) => {
                debug!(short_token, "Cache hit");
                return Ok(target);
            }
            Ok(None) => debug!(short_token, "Cache miss"),
            Err(e) => warn!(short_token, error = %e, "Cache lookup failed"),
        }

        let link = self
            .links
            .find_by_token(short_token)
            .await
            .map_err(ResolveError::LinkLookup)?
            .ok_or_else(|| ResolveError::LinkNotFound {
                token: short_token.to_string(),
            })?;

        let target = LinkTarget::from(&link);

        let cache = self.cache.clone();
        let key = short_token.to_string();
        let value = target.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set_link(&key, &value, None).await {
                warn!(short_token = %key, error = %e, "Failed to cache link");
            }
        });

        Ok(target)
    }
}
