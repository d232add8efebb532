use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One persisted search query, as stored in `processed_queries`.
/// `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QueryLogEntry {
    pub query: String,
    pub timestamp: i64,
}

/// Read-side shape of a logged query. `when` is ISO-8601 in UTC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentQuery {
    pub term: String,
    pub when: String,
}

impl From<QueryLogEntry> for RecentQuery {
    fn from(entry: QueryLogEntry) -> Self {
        let when = DateTime::<Utc>::from_timestamp_millis(entry.timestamp)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        Self {
            term: entry.query,
            when,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_query_renders_iso_8601() {
        let entry = QueryLogEntry {
            query: "lolcats".to_string(),
            timestamp: 1_700_000_000_123,
        };
        let recent = RecentQuery::from(entry);
        assert_eq!(recent.term, "lolcats");
        assert_eq!(recent.when, "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn test_recent_query_epoch_zero() {
        let entry = QueryLogEntry {
            query: "cats".to_string(),
            timestamp: 0,
        };
        let recent = RecentQuery::from(entry);
        assert_eq!(recent.when, "1970-01-01T00:00:00.000Z");
    }
}
