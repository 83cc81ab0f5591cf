mod ids;
mod level;
mod progress;
mod question;
mod session;
mod topic;

pub use ids::{LevelId, ParseIdError, QuestionId, TopicId, UserId};
pub use level::{Level, LevelError, LevelNumber};
pub use progress::ProgressFact;
pub use question::{Question, QuestionError, QuestionKind, normalize};
pub use session::{LevelView, QuestionView, QuizSession, SessionIntegrityError};
pub use topic::{Topic, TopicError};
