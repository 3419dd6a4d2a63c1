pub mod clock;
pub mod logs;
pub mod metrics;

pub use clock::{current_timestamp, subtract};
pub use logs::loki_query_range;
pub use metrics::{analyze, list_supported_analyze_type, prom_query, prom_query_range};
