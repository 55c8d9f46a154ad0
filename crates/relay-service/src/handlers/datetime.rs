//! Server date/time handler.

use crate::models::TextResponse;
use axum::Json;
use chrono::Local;
use tracing::instrument;

/// Handler for GET /datetime
///
/// Returns the server's local date and time as one preformatted line.
///
/// ## Example Response
///
/// ```json
/// {
///   "response": "\u{1F4C5} Date: Tuesday, August 26, 2025 | \u{23F0} Time: 03:14:07 PM"
/// }
/// ```
#[instrument(skip_all, name = "relay.handlers.datetime")]
pub async fn get_datetime() -> Json<TextResponse> {
    let now = Local::now();
    Json(TextResponse {
        response: format!(
            "\u{1F4C5} Date: {} | \u{23F0} Time: {}",
            now.format("%A, %B %d, %Y"),
            now.format("%I:%M:%S %p")
        ),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_datetime_format() {
        let response = get_datetime().await;
        let text = &response.0.response;

        assert!(text.starts_with("\u{1F4C5} Date: "));
        assert!(text.contains(" | \u{23F0} Time: "));
        // 12-hour clock with AM/PM marker
        assert!(text.ends_with(" AM") || text.ends_with(" PM"));
    }
}
