//! Request and value helpers shared across layers.
//!
//! - [`code_generator`] - Short token generation and validation
//! - [`url_normalizer`] - Destination URL normalization
//! - [`cookies`] - `Cookie` header parsing
//! - [`client_ip`] - Client IP resolution for click metadata

pub mod client_ip;
pub mod code_generator;
pub mod cookies;
pub mod url_normalizer;
