pub mod attendance;
pub mod lecture;
