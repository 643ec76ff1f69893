// file: src/prompt/builder.rs
// description: system instruction and user message composition for ocr requests
// reference: rule tables evaluated in a fixed order

use crate::models::{ExtractionMode, FormatOption};
use std::collections::BTreeSet;

pub const BASE_INSTRUCTION: &str = "You are a professional OCR (Optical Character Recognition) system. Your task is to:
1. Accurately extract ALL text from the provided image
2. Preserve the original formatting unless instructed otherwise
3. Identify and correct common OCR errors (like '0' vs 'O')
4. Never add or remove text that isn't in the image
5. Clearly indicate any uncertain characters with a [?] symbol

Output rules:
- Return the raw text first in a code block
- Then provide a cleaned version if needed
- Highlight any uncertain characters
- Preserve line breaks and spacing unless instructed otherwise";

pub const ENHANCED_CLAUSE: &str = "ENHANCED MODE: Pay special attention to difficult text, low-quality images, and unusual fonts.";

pub const REMOVE_LINE_BREAKS_CLAUSE: &str = "FORMATTING: Remove unnecessary line breaks and combine into paragraphs where appropriate.";

pub const PARAGRAPH_FORMAT_CLAUSE: &str =
    "FORMATTING: Reformat the text into proper paragraphs with correct punctuation.";

pub const USER_INSTRUCTION: &str = "Extract all text from this image with perfect accuracy:";

const CLAUSE_SEPARATOR: &str = "\n\n";

/// The selections a clause predicate sees.
#[derive(Debug, Clone, Copy)]
pub struct PromptOptions<'a> {
    pub mode: ExtractionMode,
    pub formatting: &'a BTreeSet<FormatOption>,
}

struct ClauseRule {
    applies: fn(&PromptOptions<'_>) -> bool,
    text: &'static str,
}

fn is_enhanced(opts: &PromptOptions<'_>) -> bool {
    opts.mode == ExtractionMode::Enhanced
}

fn removes_line_breaks(opts: &PromptOptions<'_>) -> bool {
    opts.formatting.contains(&FormatOption::RemoveLineBreaks)
}

fn formats_paragraphs(opts: &PromptOptions<'_>) -> bool {
    opts.formatting.contains(&FormatOption::ParagraphFormat)
}

// Layout preservation is the base instruction's default and adds nothing.
const CLAUSE_RULES: &[ClauseRule] = &[
    ClauseRule {
        applies: is_enhanced,
        text: ENHANCED_CLAUSE,
    },
    ClauseRule {
        applies: removes_line_breaks,
        text: REMOVE_LINE_BREAKS_CLAUSE,
    },
    ClauseRule {
        applies: formats_paragraphs,
        text: PARAGRAPH_FORMAT_CLAUSE,
    },
];

pub struct PromptBuilder;

impl PromptBuilder {
    /// Clauses selected for `options`, in rule order.
    pub fn clauses(options: &PromptOptions<'_>) -> Vec<&'static str> {
        CLAUSE_RULES
            .iter()
            .filter(|rule| (rule.applies)(options))
            .map(|rule| rule.text)
            .collect()
    }

    pub fn system_instruction(
        mode: ExtractionMode,
        formatting: &BTreeSet<FormatOption>,
    ) -> String {
        let options = PromptOptions { mode, formatting };

        let mut instruction = BASE_INSTRUCTION.to_string();
        for clause in Self::clauses(&options) {
            instruction.push_str(CLAUSE_SEPARATOR);
            instruction.push_str(clause);
        }
        instruction
    }

    pub fn user_instruction() -> &'static str {
        USER_INSTRUCTION
    }
}
