//! VQA Common Library
//!
//! パイプライン本体とテストで共有される型・プロンプト・パーサー

pub mod types;
pub mod chat;
pub mod error;
pub mod prompts;
pub mod parser;

pub use types::{InputRow, Prediction, VisionOutcome, FALLBACK_ANSWER};
pub use chat::{ChatMessage, ChatRequest, ChatResponse, ContentPart, ImageUrl, MessageContent};
pub use error::{Error, Result};
pub use prompts::{build_direct_prompt, build_reasoning_prompt, build_vision_prompt, ANSWER_MARKER};
pub use parser::{clean_text, extract_answer, extract_first_choice, is_content_restricted};
