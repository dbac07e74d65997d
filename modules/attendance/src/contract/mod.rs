pub mod client;
pub mod error;
pub mod model;

pub use client::AttendanceApi;
pub use error::AttendanceError;
pub use model::*;
