pub mod attendance;
pub mod home;
pub mod scan;
pub mod students;
