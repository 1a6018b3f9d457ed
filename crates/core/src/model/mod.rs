mod ids;
mod ledger;
mod navigator;
mod question;
mod quiz;
mod session_clock;
mod snapshot;

pub use ids::{ParseIdError, QuizId};

pub use ledger::{AnswerLedger, LedgerError};
pub use navigator::{Navigator, Step};
pub use question::{Question, QuestionError};
pub use quiz::{QuizDefinition, QuizDefinitionError};
pub use session_clock::SessionClock;
pub use snapshot::{SessionSnapshot, SnapshotRecord};
