//! Layered environment configuration for Mobius modules.
//!
//! This crate resolves the effective environment for one module: the module's
//! own `.env` wins, the shared `mobius-config/.env` fills the gaps, and the
//! Google credentials path is normalized. The result is an immutable
//! [`ModuleEnv`]; the process environment is never modified.

pub mod constants;
mod loader;
pub mod paths;

pub use loader::{ConfigError, EnvLoader, ModuleEnv, is_placeholder};

