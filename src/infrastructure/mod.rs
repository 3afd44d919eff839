pub mod assembler;
pub mod generator;

pub use assembler::{Assembler, FileAssembler};
pub use generator::{ContentGenerator, GenerationRequest, LlmGenerator};
