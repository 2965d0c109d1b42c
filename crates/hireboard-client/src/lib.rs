pub mod config;
pub mod http;

pub use config::RecordClientConfig;
pub use http::HttpRecordClient;
