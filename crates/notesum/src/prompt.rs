//! Summarization prompt construction.
//!
//! The prompt language follows the note: notes containing Hangul get Korean
//! instructions, everything else English. Summary length controls both the
//! instruction wording and the response token limit.

use serde::{Deserialize, Serialize};

/// How long the generated summary should be.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    /// Three to five sentences.
    Short,
    /// One or two paragraphs.
    #[default]
    Standard,
    /// Two or three paragraphs.
    Detailed,
}

impl SummaryLength {
    /// Length instruction in the prompt's language.
    pub fn instruction(self, korean: bool) -> &'static str {
        match (self, korean) {
            (SummaryLength::Short, true) => "3-5문장",
            (SummaryLength::Standard, true) => "1-2단락",
            (SummaryLength::Detailed, true) => "2-3단락",
            (SummaryLength::Short, false) => "3-5 sentences",
            (SummaryLength::Standard, false) => "1-2 paragraphs",
            (SummaryLength::Detailed, false) => "2-3 paragraphs",
        }
    }

    /// Response token limit for this length.
    pub fn max_tokens(self) -> u32 {
        match self {
            SummaryLength::Short => 512,
            SummaryLength::Standard => 1024,
            SummaryLength::Detailed => 2048,
        }
    }
}

impl std::fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryLength::Short => write!(f, "short"),
            SummaryLength::Standard => write!(f, "standard"),
            SummaryLength::Detailed => write!(f, "detailed"),
        }
    }
}

/// Whether `text` contains any precomposed Hangul syllable.
pub fn contains_hangul(text: &str) -> bool {
    text.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c))
}

/// Build the single user message sent to the provider.
pub fn build_prompt(content: &str, length: SummaryLength) -> String {
    let korean = contains_hangul(content);
    let instruction = length.instruction(korean);

    if korean {
        format!(
            "다음 마크다운 노트를 {instruction}로 요약해주세요.

요약 규칙:
1. 핵심 내용과 주요 논점만 포함하세요
2. 원문의 주요 개념과 결론을 명확히 전달하세요
3. 불필요한 세부사항은 생략하세요
4. 마크다운 포맷을 유지하되, 헤딩은 사용하지 마세요
5. 자연스러운 한국어로 작성하세요

노트 내용:
{content}"
        )
    } else {
        format!(
            "Please summarize the following markdown note in {instruction}.

Summary rules:
1. Include only key points and main arguments
2. Clearly convey the main concepts and conclusions
3. Omit unnecessary details
4. Maintain markdown format but don't use headings
5. Write in natural English

Note content:
{content}"
        )
    }
}
