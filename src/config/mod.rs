//! Deployment configuration: `credvault.toml` plus environment overrides.

pub mod settings;

pub use settings::{KeySources, Settings};
