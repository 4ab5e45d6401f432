//! Translation of extracted candidates through a conversational backend.
//!
//! ## Module Structure
//!
//! - `backend`: the backend seam and its error type
//! - `batch`: worker batches, phrase grouping and token-bounded questions
//! - `mock`: deterministic backend for tests and dry runs
//! - `operator`: the human operator consulted when the backend misbehaves
//! - `orchestrator`: the concurrent translation run
//! - `reply`: instruction text and reply parsing
//! - `tokens`: token estimation

pub mod backend;
pub mod batch;
pub mod mock;
pub mod operator;
pub mod orchestrator;
pub mod reply;
pub mod tokens;

pub use backend::{BackendError, BackendResult, ConversationId, TranslationBackend};
pub use batch::{Phrase, Question};
pub use mock::{MockBackend, MockCall, MockMode};
pub use operator::{OperatorPrompt, ScriptedOperator, StdinOperator};
pub use orchestrator::{OrchestratorSettings, TranslationOrchestrator, TranslationSummary};
pub use reply::{Answers, ReplyError, build_instruction, parse_answers, repair_quotes};
pub use tokens::{BpeTokenCounter, CharTokenCounter, TokenCounter};
