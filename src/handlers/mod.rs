// handlers/mod.rs - Two-tier handler layout
//
// Public (no token) → Protected (token required, author-only for mutation)
pub mod protected; // Tier 2: token required (POST/PATCH/DELETE on surveys)
pub mod public; // Tier 1: no authentication (listing, detail, signup, login)
pub mod utils;

use crate::error::ApiError;

/// Fallback for every unmatched route
pub async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}
