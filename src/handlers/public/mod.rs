// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Read access to surveys, plus token acquisition for authors.
pub mod health;
pub mod surveys;
pub mod users;
