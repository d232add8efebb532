pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod store;

pub use config::{AppConfig, DatabaseConfig, HttpConfig, SearchConfig};
pub use error::StoreError;
pub use models::query_log::{QueryLogEntry, RecentQuery};
pub use models::search_result::SearchResult;
pub use search::{ImageSearchClient, SearchError, RESULT_COUNT};
pub use store::{QueryLog, RECENT_LIMIT};
