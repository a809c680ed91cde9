pub mod battlemetrics;
pub mod hacker_news;
pub mod openai;
pub mod presence;
pub mod seen;
pub mod webhook;
pub mod yts;
