pub mod report_file;
pub mod sqlite;

pub use report_file::{read_report, write_optimized, write_report};
pub use sqlite::{RunRecord, SqliteStorage};
