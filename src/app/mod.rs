pub mod console;
pub mod dispatch;
pub mod render;
