pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod pronunciation;

pub use config::SchedulerConfig;
pub use error::{Error, Result};
pub use models::{
    Quality, ReviewItem, ReviewSession, ReviewStats, due_items, prioritize, review_stats,
    schedule_next_review,
};
