//! Prompt builders for the text-generation service
//!
//! The rendered strings are a contract with the service: it is asked for a
//! single JSON object keyed `answer`, `corrections`, `hints`, `vocab`.

use super::language::DetectedLanguage;
use super::level::{level_descriptor, Level, TargetLanguage};
use super::plan::{LearningFocus, PipelineInput, PipelinePlan};

const PERSONA: &str = "You are Kai, a friendly language coach.";

const BASE_GOALS: [&str; 2] = [
    "Reply in English unless explicitly asked otherwise.",
    "Keep responses concise and easy to understand.",
];

/// Everything the system prompts depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptContext {
    pub level: Level,
    pub target_language: TargetLanguage,
    pub detected_lang: DetectedLanguage,
    pub enable_corrections: bool,
    pub enable_hints: bool,
}

impl PromptContext {
    pub fn new(input: &PipelineInput, plan: &PipelinePlan) -> Self {
        Self {
            level: input.level,
            target_language: input.target_language,
            detected_lang: plan.detected_lang,
            enable_corrections: input.enable_corrections,
            enable_hints: input.enable_hints,
        }
    }

    pub fn focus(&self) -> LearningFocus {
        LearningFocus::decide(self.detected_lang, self.enable_corrections, self.enable_hints)
    }
}

fn render_list(base: String, heading: &str, items: &[&str]) -> String {
    let mut lines = Vec::with_capacity(items.len() + 2);
    lines.push(base);
    lines.push(heading.to_string());
    lines.extend(items.iter().map(|item| format!("- {}", item)));
    lines.join("\n")
}

/// Single-pass system prompt: answer plus corrections/hints plus vocabulary
pub fn build_system_prompt(ctx: &PromptContext) -> String {
    let base = format!(
        "{} {} Always encourage the learner.",
        PERSONA,
        level_descriptor(ctx.level)
    );

    let mut goals: Vec<&str> = BASE_GOALS.to_vec();
    match ctx.focus() {
        LearningFocus::Hints => goals.push(
            "If the user used their L1 (e.g., Chinese), provide a natural English phrasing for their intent.",
        ),
        LearningFocus::Corrections => goals.push(
            "If the user writes English, provide gentle grammar corrections and a better phrasing.",
        ),
        LearningFocus::None => {}
    }
    goals.push(
        "Extract 3-5 useful vocabulary items from your reply and explain their meaning in this context briefly.",
    );

    render_list(base, "Goals:", &goals)
}

/// Streaming-first system prompt: only the learner-facing answer
pub fn build_answer_only_system_prompt(ctx: &PromptContext) -> String {
    let base = format!(
        "{} {} Reply only with what you would say to the learner.",
        PERSONA,
        level_descriptor(ctx.level)
    );

    let mut guidelines: Vec<&str> = BASE_GOALS.to_vec();
    if ctx.focus() == LearningFocus::Hints {
        guidelines.push(
            "The user may have used L1; infer their intent and reply naturally in English.",
        );
    }

    render_list(base, "Guidelines:", &guidelines)
}

/// Wrap the learner's message in the JSON reply instructions
pub fn build_user_prompt(user_text: &str) -> String {
    format!(
        concat!(
            "User message:\n{}\n\nRespond in JSON with keys: \n",
            "  answer: string (the final answer you would say to the learner),\n",
            "  corrections?: {{ original: string, corrected: string, explanation: string }}[] (if any),\n",
            "  hints?: string[] (natural English expressions for the user's intent, if L1 was used),\n",
            "  vocab: {{ word: string, meaning: string, why: string }}[] (brief, in-context).\n",
            "Return ONLY JSON, no code fences."
        ),
        user_text
    )
}

/// Inputs for the post-process prompt
#[derive(Debug, Clone, Copy)]
pub struct PostProcessParams<'a> {
    pub user_text: &'a str,
    pub final_answer: &'a str,
    pub level: Level,
    pub detected_lang: DetectedLanguage,
    pub enable_corrections: bool,
    pub enable_hints: bool,
}

impl PostProcessParams<'_> {
    pub fn focus(&self) -> LearningFocus {
        LearningFocus::decide(self.detected_lang, self.enable_corrections, self.enable_hints)
    }
}

/// Prompt that extracts corrections, hints and richer vocabulary from a
/// finished answer.
///
/// The user text and answer are embedded verbatim between `---` lines. They
/// are not escaped, so an answer that itself contains `---` can blur the
/// block boundaries for the model.
pub fn build_post_process_prompt(params: &PostProcessParams<'_>) -> String {
    let mut wanted: Vec<&str> = Vec::with_capacity(2);
    wanted.extend(params.focus().response_key());
    wanted.push("vocab");

    let parts = [
        "You are Kai, a precise post-processor for language coaching outputs.".to_string(),
        level_descriptor(params.level).to_string(),
        "Using the user input and the assistant final answer, extract helpful learning signals.".to_string(),
        format!("Return ONLY JSON with keys: answer, {}.", wanted.join(", ")),
        concat!(
            "Rules for vocab: return 4-8 items most useful for the learner at this level; ",
            "each item must include: word, partOfSpeech, meaning (in this context), ",
            "example (short snippet from the final answer or a closely matching sentence), ",
            "cefr (A2/B1/B2/C1 approx), and why (1 short reason)."
        )
        .to_string(),
        "Keep explanations short. JSON only, no code fences.".to_string(),
        "---".to_string(),
        "User input:".to_string(),
        params.user_text.to_string(),
        "---".to_string(),
        "Assistant final answer:".to_string(),
        params.final_answer.to_string(),
        "---".to_string(),
        "JSON shape example (illustrative, adapt fields if missing):".to_string(),
        concat!(
            r#"{"answer":"<finalAnswer>","corrections":[{"original":"","corrected":"","explanation":""}],"#,
            r#""hints":["..."],"vocab":[{"word":"","partOfSpeech":"","meaning":"","example":"","cefr":"B1","why":""}]}"#
        )
        .to_string(),
    ];

    let prompt = parts.join("\n");
    tracing::debug!("Post-process prompt length: {} chars", prompt.len());
    prompt
}
