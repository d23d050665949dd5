pub mod chartmetric;
mod core;
pub mod hitl;
pub mod llm;

pub use self::core::Config;
pub use chartmetric::ChartmetricConfig;
pub use hitl::HitlConfig;
pub use llm::LlmConfig;
