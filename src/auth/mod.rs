pub mod chartmetric;
pub mod token_cache;

pub use chartmetric::{ChartmetricTokenCache, ChartmetricTokenSource, chartmetric_token_cache};
pub use token_cache::{AccessTokenCache, TokenSource};
