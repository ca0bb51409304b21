//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated, immutable)
//!     → LoadBalancer::from_config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the balancer is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BalancerConfig, HealthCheckConfig, ObservabilityConfig, PoolConfig, RetryConfig};
pub use validation::{validate_config, ValidationError};
