//! HTTP request handlers for the relay service.

pub mod chat;
pub mod datetime;
pub mod documents;
pub mod health;
pub mod me;
pub mod metrics;
pub mod news;
pub mod search;
pub mod weather;

pub use chat::chat;
pub use datetime::get_datetime;
pub use documents::{analyze_image, analyze_pdf};
pub use health::{health, home};
pub use me::get_me;
pub use metrics::metrics_handler;
pub use news::{news_by_country, news_by_topic};
pub use search::search_web;
pub use weather::get_weather;
