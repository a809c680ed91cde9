//! Message and reaction handlers registered with the event router.

pub mod chat;
pub mod lifecycle;
pub mod who;
