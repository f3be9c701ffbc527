pub mod guard;
pub mod response;

pub use guard::{bearer_token, session_guard, RequestAccessToken};
pub use response::{ApiResponse, ApiResult};
