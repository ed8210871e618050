// Application layer: command runners wiring config, adapters and core together
pub mod commands;

pub use commands::{build_service, run_quiz, run_resolve, QuizSummary, ResolveReport};
