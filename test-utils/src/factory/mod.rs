//! Factory methods for creating test data.
//!
//! Each entity has a `Factory` struct for customization and a `create_*`
//! convenience function for quick default creation.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let marker = factory::key_value::KeyValueFactory::new(&db)
//!     .key("hacker_news_seen_items")
//!     .json(&serde_json::json!([1, 2, 3]))
//!     .build()
//!     .await?;
//! ```

pub mod helpers;
pub mod key_value;

pub use key_value::create_key_value;
