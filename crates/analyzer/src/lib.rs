pub mod report;
pub mod summary;

pub use report::{CategoryTotal, DailyCount, MonthBucket, Report, Totals};
pub use summary::data_summary;
