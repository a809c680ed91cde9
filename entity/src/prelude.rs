pub use super::key_value::Entity as KeyValue;
