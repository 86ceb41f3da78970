mod client;

pub use client::ScheduleApiClient;
