pub mod config;
pub mod listing;
pub mod log;
pub mod path;
pub mod theme;
