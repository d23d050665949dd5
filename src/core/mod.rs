pub mod extraction;
pub mod intake;
pub mod providers;
