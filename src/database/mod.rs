pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod record;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use record::{FieldPolicy, RecordError, SURVEY_FIELDS};
pub use repository::{SurveyRepository, UserRepository};
