pub mod backend;
pub mod file;

pub use backend::ScheduleApiClient;
pub use file::FileSource;
