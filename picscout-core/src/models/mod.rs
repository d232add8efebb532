pub mod query_log;
pub mod search_result;
