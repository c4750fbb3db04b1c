//! Prompt command - render a prompt for inspection

use anyhow::Result;
use kai_core::pipeline::{
    build_answer_only_system_prompt, build_post_process_prompt, build_system_prompt,
    build_user_prompt, PostProcessParams, PromptContext,
};
use kai_core::{plan_pipeline, CoachOptions, Config, PipelineInput};

use super::PromptKind;

pub fn run(
    config: &Config,
    text: &str,
    kind: PromptKind,
    answer: Option<&str>,
    options: &CoachOptions,
) -> Result<()> {
    let user_text = config.truncate_input(text);
    let input = PipelineInput {
        user_text: user_text.to_string(),
        target_language: options.target_language,
        level: options.level,
        enable_corrections: options.enable_corrections,
        enable_hints: options.enable_hints,
    };
    let plan = plan_pipeline(&input);
    let ctx = PromptContext::new(&input, &plan);

    let prompt = match kind {
        PromptKind::System => build_system_prompt(&ctx),
        PromptKind::AnswerOnly => build_answer_only_system_prompt(&ctx),
        PromptKind::User => build_user_prompt(user_text),
        PromptKind::PostProcess => {
            let Some(final_answer) = answer else {
                anyhow::bail!("--answer is required for the post-process prompt");
            };
            build_post_process_prompt(&PostProcessParams {
                user_text,
                final_answer,
                level: options.level,
                detected_lang: plan.detected_lang,
                enable_corrections: options.enable_corrections,
                enable_hints: options.enable_hints,
            })
        }
    };

    println!("{}", prompt);
    Ok(())
}
