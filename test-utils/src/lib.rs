//! Homebot Test Utils
//!
//! Shared testing utilities for the bot's persistence layer. This crate offers a
//! builder for creating test contexts with in-memory SQLite databases and
//! factories for seeding rows.
//!
//! # Overview
//!
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment holding the database connection
//! - **TestError**: Errors that can occur during test setup
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//! use entity::prelude::KeyValue;
//!
//! #[tokio::test]
//! async fn stores_markers() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_table(KeyValue)
//!         .build()
//!         .await?;
//!
//!     let db = test.db.as_ref().unwrap();
//!     // Perform database operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
