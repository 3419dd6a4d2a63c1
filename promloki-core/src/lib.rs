//! Core of the Prometheus/Loki MCP bridge.
//!
//! The pure helpers (`duration`, `step`, `timestamp`, `result`, `template`)
//! hold no state and may be called from any thread. The HTTP clients and the
//! analyze service build on them.

pub mod analyzer;
pub mod client;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod models;
pub mod result;
pub mod step;
pub mod template;
pub mod timestamp;

pub use analyzer::AnalyzeService;
pub use client::{LokiClient, MetricsBackend, PrometheusClient};
pub use config::{ConfigManager, GlobalConfig};
pub use duration::{parse_duration, parse_duration_strict, render_duration, DurationError};
pub use error::{ClientError, ConfigError};
pub use models::{AnalyzeRequest, AnalyzeResponse, QueryData, QueryParams};
pub use result::{rewrite_data_timestamps, rewrite_result_timestamps, ResultKind};
pub use step::{apply_min_step, compute_adaptive_step, StepError, CANDIDATE_STEPS};
pub use timestamp::{
    parse_rfc3339_nano_to_nanos, render_display_timestamp, DisplayPrecision, EpochUnit,
    TimestampError,
};
