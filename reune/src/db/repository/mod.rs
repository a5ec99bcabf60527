mod analytics;
mod contexts;
mod feedback;
mod messages;

pub use analytics::AnalyticsRepository;
pub use contexts::ContextRepository;
pub use feedback::FeedbackRepository;
pub use messages::MessageRepository;

use chrono::{DateTime, SecondsFormat, Utc};

/// Stored timestamps are fixed-width UTC so they compare correctly as text.
pub(crate) fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
