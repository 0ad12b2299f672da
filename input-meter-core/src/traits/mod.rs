pub mod engine_backend;
pub mod session_backend;
