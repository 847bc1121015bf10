pub mod quality;
pub mod queue;
pub mod review_item;
pub mod review_session;
pub mod review_stats;
pub mod sm2;

pub use quality::Quality;
pub use queue::{due_items, prioritize};
pub use review_item::ReviewItem;
pub use review_session::ReviewSession;
pub use review_stats::{ReviewStats, review_stats};
pub use sm2::schedule_next_review;
