pub mod schema;

pub use schema::{ChartmetricConfig, Config, HitlConfig, LlmConfig};
