pub mod store;

pub use store::{JsonFileSessionStore, SessionStore, SessionSummary};
