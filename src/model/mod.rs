pub mod chat;
pub mod event;
pub mod hacker_news;
pub mod movie;
pub mod presence;
