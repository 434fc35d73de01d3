pub mod attendance_service;
pub mod caller;
pub mod error;
pub mod roster_service;
pub mod summary_service;
pub mod user_service;

pub use caller::{Caller, Role};
pub use error::{ServiceError, ServiceResult};
