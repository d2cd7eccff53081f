pub mod record;
pub mod stats_store;
pub mod summary;

pub use record::StatsRecord;
pub use stats_store::StatsStore;
pub use summary::DaySummary;
