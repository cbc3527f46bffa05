//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A shortened URL mapping with its click counter
//! - [`Click`] - A recorded resolution of a short link
//! - [`RedirectRule`] - A header/cookie predicate that overrides a link's destination
//!
//! Creation inputs live next to each entity (`NewLink`, `NewClick`,
//! `NewRedirectRule`).

pub mod click;
pub mod link;
pub mod redirect_rule;

pub use click::{Click, DeviceType, NewClick};
pub use link::{Link, LinkTarget, NewLink};
pub use redirect_rule::{
    MatchMethod, NewRedirectRule, RedirectRule, RuleDefinition, TargetType, UnknownTag,
};
