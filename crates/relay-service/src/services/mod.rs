//! Upstream clients and content extraction for the relay service.
//!
//! # Components
//!
//! - `chat_client` - Chat completion upstream (OpenAI-compatible API)
//! - `news_client` - News headlines upstream
//! - `weather_client` - Current weather upstream
//! - `search_client` - Web search via HTML scraping
//! - `extraction` - PDF text extraction and image OCR

pub mod chat_client;
pub mod extraction;
pub mod news_client;
pub mod search_client;
pub mod weather_client;

pub use chat_client::{ChatClient, ChatMessage};
pub use news_client::NewsClient;
pub use search_client::{SearchClient, SearchHit};
pub use weather_client::{WeatherClient, WeatherReport};
