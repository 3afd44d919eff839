pub mod block_stage;
pub mod comparison_stage;
pub mod generation;
pub mod parser_stage;
pub mod prompts;
pub mod question_stage;
pub mod retry;

pub use block_stage::BlockStage;
pub use comparison_stage::{ComparisonOutcome, ComparisonStage};
pub use parser_stage::ParserStage;
pub use question_stage::QuestionStage;
pub use retry::{with_retry, RetryPolicy};
