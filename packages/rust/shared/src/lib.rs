//! Shared types, error model, and configuration for enrichmail.
//!
//! This crate is the foundation depended on by all other enrichmail crates.
//! It provides:
//! - [`EnrichmailError`] — the unified error type
//! - Domain types ([`VerificationRecord`], [`RiskClassification`],
//!   [`EnrichmentRow`], [`RunId`]) and the [`normalize_address`] join key
//! - Configuration ([`AppConfig`], config loading, API key resolution)
//! - [`CancelFlag`] — cooperative between-call cancellation

pub mod cancel;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use cancel::CancelFlag;
pub use config::{
    AppConfig, DefaultsConfig, HighlightConfig, ProviderConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
pub use error::{EnrichmailError, Result};
pub use types::{
    DeliverabilityStatus, EnrichmentRow, RecommendedAction, RiskClassification, RiskTier, RunId,
    VerificationRecord, normalize_address,
};
