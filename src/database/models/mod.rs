pub mod choice;
pub mod question;
pub mod survey;
pub mod user;

pub use choice::Choice;
pub use question::{NewQuestion, Question, QuestionType};
pub use survey::{NewSurvey, Survey, SurveyDetail, SurveyPatch};
pub use user::{NewUser, User};
