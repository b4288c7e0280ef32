//! Layered `.env` loading for a single module.
//!
//! Responsibilities:
//! - Merge the ambient environment, the module `.env` and the global `mobius-config/.env`.
//! - Normalize `GOOGLE_APPLICATION_CREDENTIALS` (placeholders, relative paths, discovery).
//! - Expose read accessors that treat blank and placeholder values as unset.
//!
//! Does NOT handle:
//! - Writing anything back to the process environment.
//! - Validating module-specific variables (consumers call `require()`).
//!
//! Invariants / Assumptions:
//! - Module `.env` values override ambient values.
//! - Global `.env` values never override a value that is already set.
//! - Missing `.env` files are not errors.
//! - The `DOTENV_DISABLED` variable is checked before any file is read.

mod builder;
mod credentials;
mod env;
mod error;

pub use builder::EnvLoader;
pub use credentials::is_placeholder;
pub use env::ModuleEnv;
pub use error::ConfigError;

#[cfg(test)]
mod tests;
