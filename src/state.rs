//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AuthService, ClickRecorder, LinkService, RedirectService, RuleService, StatsService,
};
use crate::domain::repositories::{
    ClickRepository, LinkRepository, RedirectRuleRepository, TokenRepository,
};
use crate::infrastructure::cache::CacheService;

pub type DynLinkService = LinkService<dyn LinkRepository>;
pub type DynRuleService = RuleService<dyn RedirectRuleRepository, dyn LinkRepository>;
pub type DynStatsService = StatsService<dyn ClickRepository, dyn LinkRepository>;
pub type DynAuthService = AuthService<dyn TokenRepository>;
pub type DynRedirectService =
    RedirectService<dyn LinkRepository, dyn RedirectRuleRepository, dyn ClickRepository>;

/// Repository handles the services are built from.
#[derive(Clone)]
pub struct Repositories {
    pub links: Arc<dyn LinkRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub rules: Arc<dyn RedirectRuleRepository>,
    pub tokens: Arc<dyn TokenRepository>,
}

/// Application state shared across handlers.
///
/// Cheap to clone: every field is behind an [`Arc`].
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub rule_service: Arc<DynRuleService>,
    pub stats_service: Arc<DynStatsService>,
    pub auth_service: Arc<DynAuthService>,
    pub redirect_service: Arc<DynRedirectService>,
    pub cache: Arc<dyn CacheService>,
    /// Read the client IP from forwarding headers instead of the peer address.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires all services over one set of repositories and a cache.
    pub fn new(
        repos: Repositories,
        cache: Arc<dyn CacheService>,
        base_url: String,
        token_signing_secret: String,
        behind_proxy: bool,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(
            repos.links.clone(),
            cache.clone(),
            base_url,
        ));
        let rule_service = Arc::new(RuleService::new(repos.rules.clone(), repos.links.clone()));
        let stats_service = Arc::new(StatsService::new(repos.clicks.clone(), repos.links.clone()));
        let auth_service = Arc::new(AuthService::new(repos.tokens, token_signing_secret));
        let redirect_service = Arc::new(RedirectService::new(
            repos.links,
            repos.rules,
            ClickRecorder::new(repos.clicks),
            cache.clone(),
        ));

        Self {
            link_service,
            rule_service,
            stats_service,
            auth_service,
            redirect_service,
            cache,
            behind_proxy,
        }
    }
}
