//! The provider process harness: environment/credential loading and the
//! admin HTTP surface.

pub mod admin;
pub mod config;
pub mod credentials;

pub use admin::{router as admin_router, SessionHealth};
pub use config::{HarnessConfig, ProviderDefaults};
pub use credentials::Credentials;
