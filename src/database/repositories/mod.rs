pub mod advance;
pub mod attendance;
pub mod setting;
pub mod worker;

// Re-export all repositories for easy importing
pub use advance::AdvanceRepository;
pub use attendance::AttendanceRepository;
pub use setting::SettingRepository;
pub use worker::WorkerRepository;
