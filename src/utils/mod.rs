pub mod csv_export;
pub mod recent_scans;
pub mod roll_number_filter;
pub mod student_cache;
