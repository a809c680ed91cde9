//! SeaORM entities for the bot's SQLite database.

pub mod prelude;

pub mod key_value;
