pub mod config;
pub mod context;
pub mod logging;
pub mod theme;
pub mod video_id;
