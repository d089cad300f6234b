//! Advice/summary generation — prompt, model call, defensive parse.
//!
//! The model call is the only fallible step surfaced to callers, and even
//! that degrades to an `AiFailure` body rather than an error: the client
//! always gets something it can render.

use super::parser::{parse_advice_response, parse_summary_response};
use super::prompt::{
    ai_error_message, build_advice_prompt, build_summary_prompt, disclaimer, DEFAULT_LANGUAGE,
};
use super::types::{
    AdviceOutcome, AdviceResponse, AiFailure, HealthData, SummaryOutcome, SummaryResponse,
    UserProfile,
};
use crate::model::{GenerateRequest, GenerativeClient};

/// Advice and summary generations run cooler than OCR: the reply is prose
/// shaped by reference tables, not digit transcription.
const ADVICE_TEMPERATURE: f32 = 0.3;

/// Generate combined health advice.
pub async fn generate_health_advice(
    client: &dyn GenerativeClient,
    language: Option<&str>,
    profile: Option<&UserProfile>,
    data: &HealthData,
) -> AdviceOutcome {
    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    let prompt = build_advice_prompt(language, profile, data);

    let text = match call_model(client, prompt).await {
        Ok(text) => text,
        Err(()) => return AdviceOutcome::Failed(ai_failure(language)),
    };

    let (status, advice) = parse_advice_response(&text, language);
    AdviceOutcome::Generated(AdviceResponse {
        success: true,
        analyzed_types: owned(data.analyzed_types()),
        status,
        advice,
        disclaimer: disclaimer(language),
    })
}

/// Generate a combined health summary, optionally note-driven.
pub async fn generate_health_summary(
    client: &dyn GenerativeClient,
    language: Option<&str>,
    profile: Option<&UserProfile>,
    data: &HealthData,
    custom_note: Option<&str>,
) -> SummaryOutcome {
    let language = language.unwrap_or(DEFAULT_LANGUAGE);
    let prompt = build_summary_prompt(language, profile, data, custom_note);

    let text = match call_model(client, prompt).await {
        Ok(text) => text,
        Err(()) => return SummaryOutcome::Failed(ai_failure(language)),
    };

    let (status, summary) = parse_summary_response(&text, language);

    let mut analyzed_types = owned(data.analyzed_types());
    if analyzed_types.is_empty()
        && custom_note.map(str::trim).is_some_and(|n| !n.is_empty())
    {
        analyzed_types.push("custom_note".to_string());
    }

    SummaryOutcome::Generated(SummaryResponse {
        success: true,
        analyzed_types,
        status,
        summary,
        disclaimer: disclaimer(language),
    })
}

async fn call_model(client: &dyn GenerativeClient, prompt: String) -> Result<String, ()> {
    client
        .generate(GenerateRequest {
            prompt,
            image: None,
            temperature: ADVICE_TEMPERATURE,
        })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "advice model call failed");
        })
}

fn ai_failure(language: &str) -> AiFailure {
    AiFailure {
        success: false,
        error: "AI_ERROR",
        message: ai_error_message(language),
        disclaimer: disclaimer(language),
    }
}

fn owned(types: Vec<&'static str>) -> Vec<String> {
    types.into_iter().map(str::to_string).collect()
}
