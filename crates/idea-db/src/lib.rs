//! # idea-db
//!
//! Database layer implementing the repository traits of `idea-core`.
//!
//! ## Overview
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - PostgreSQL repository implementations
//! - In-memory repository implementations for tests and single-process setups
//!
//! ## Usage
//!
//! ```rust,ignore
//! use idea_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use idea_db::PgIdeaRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let ideas = PgIdeaRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{MemoryChannelSettingsRepository, MemoryIdeaRepository};
pub use pool::{create_pool, create_pool_from_env, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgChannelSettingsRepository, PgIdeaRepository};
