// handlers/protected/mod.rs - Protected handlers (token required)
//
// Every handler here takes `Authenticated`, so a missing or bad token is
// rejected before any store access. Mutations of an existing survey then
// check existence (404) before ownership (401).
pub mod surveys;
