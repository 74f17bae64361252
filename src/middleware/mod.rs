pub mod auth;
pub mod body;
pub mod response;

pub use auth::{AuthUser, Authenticated};
pub use body::JsonObject;
pub use response::{ApiResponse, ApiResult};
