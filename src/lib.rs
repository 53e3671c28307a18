pub mod collector;
pub mod config;
pub mod crt_sh;
pub mod enumeration;
pub mod error;
pub mod retry;
pub mod utils;

// Re-export common types for easier access
pub use collector::{IngestStats, NameKind, SubdomainCollector};
pub use config::Config;
pub use enumeration::{run, Enumerator};
pub use error::FetchError;
pub use retry::RetryPolicy;
