// file: src/prompt/mod.rs
// description: prompt composition module exports
// reference: internal module structure

mod builder;

pub use builder::{
    BASE_INSTRUCTION, ENHANCED_CLAUSE, PARAGRAPH_FORMAT_CLAUSE, PromptBuilder, PromptOptions,
    REMOVE_LINE_BREAKS_CLAUSE, USER_INSTRUCTION,
};
