pub mod handler;
pub mod logging;
