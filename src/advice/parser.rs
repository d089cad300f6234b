//! Parse model replies into status + advice/summary sections.
//!
//! Missing keys default to empty-but-well-typed shapes so consumers never
//! need null-checks below the top level. A reply with no recoverable JSON
//! yields a neutral grey fallback that still renders.

use serde_json::Value;

use super::prompt::DEFAULT_LANGUAGE;
use super::types::{AdviceSections, HealthStatus, StatusLevel, SummarySections};
use crate::ocr::extract::extract_json;

/// Grey used for the "could not analyze" fallback card.
const FALLBACK_COLOR: &str = "#9E9E9E";

/// Parse an advice reply; never fails.
pub fn parse_advice_response(text: &str, language: &str) -> (HealthStatus, AdviceSections) {
    match extract_json(text) {
        Ok(payload) => {
            let status = parse_status(&payload);
            let advice = AdviceSections {
                summary: str_at(&payload, "advice", "summary"),
                details: list_at(&payload, "advice", "details"),
                lifestyle: list_at(&payload, "advice", "lifestyle"),
                dietary: list_at(&payload, "advice", "dietary"),
                warnings: list_at(&payload, "advice", "warnings"),
                should_see_doctor: bool_at(&payload, "advice", "should_see_doctor"),
            };
            (status, advice)
        }
        Err(_) => {
            tracing::warn!(raw_len = text.len(), "advice reply had no parsable JSON");
            (fallback_status(language), fallback_advice(language))
        }
    }
}

/// Parse a summary reply; never fails.
pub fn parse_summary_response(text: &str, language: &str) -> (HealthStatus, SummarySections) {
    match extract_json(text) {
        Ok(payload) => {
            let status = parse_status(&payload);
            let summary = SummarySections {
                overview: str_at(&payload, "summary", "overview"),
                details: list_at(&payload, "summary", "details"),
                lifestyle: list_at(&payload, "summary", "lifestyle"),
                dietary: list_at(&payload, "summary", "dietary"),
                warnings: list_at(&payload, "summary", "warnings"),
                should_see_doctor: bool_at(&payload, "summary", "should_see_doctor"),
            };
            (status, summary)
        }
        Err(_) => {
            tracing::warn!(raw_len = text.len(), "summary reply had no parsable JSON");
            (fallback_status(language), fallback_summary(language))
        }
    }
}

fn parse_status(payload: &Value) -> HealthStatus {
    let block = payload.get("status");
    let level = block
        .and_then(|s| s.get("level"))
        .and_then(|l| serde_json::from_value::<StatusLevel>(l.clone()).ok())
        .unwrap_or_default();

    let color = block
        .and_then(|s| s.get("color"))
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| level.default_color().to_string());

    HealthStatus {
        level,
        title: block
            .and_then(|s| s.get("title"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: block
            .and_then(|s| s.get("description"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        color,
    }
}

fn str_at(payload: &Value, section: &str, key: &str) -> String {
    payload
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn list_at(payload: &Value, section: &str, key: &str) -> Vec<String> {
    payload
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn bool_at(payload: &Value, section: &str, key: &str) -> bool {
    payload
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn fallback_status(language: &str) -> HealthStatus {
    let (title, description) = if language == DEFAULT_LANGUAGE {
        ("無法分析", "無法解析健康數據")
    } else {
        ("Unable to analyze", "The health data could not be interpreted")
    };
    HealthStatus {
        level: StatusLevel::Normal,
        title: title.to_string(),
        description: description.to_string(),
        color: FALLBACK_COLOR.to_string(),
    }
}

fn fallback_advice(language: &str) -> AdviceSections {
    let (summary, warning) = if language == DEFAULT_LANGUAGE {
        ("無法生成建議", "建議諮詢醫療專業人員")
    } else {
        ("Unable to generate advice", "Please consult a medical professional")
    };
    AdviceSections {
        summary: summary.to_string(),
        warnings: vec![warning.to_string()],
        should_see_doctor: true,
        ..AdviceSections::default()
    }
}

fn fallback_summary(language: &str) -> SummarySections {
    let (overview, warning) = if language == DEFAULT_LANGUAGE {
        ("無法生成摘要", "如有疑慮請諮詢醫療專業人員")
    } else {
        (
            "Unable to generate a summary",
            "Please consult a medical professional if concerned",
        )
    };
    SummarySections {
        overview: overview.to_string(),
        warnings: vec![warning.to_string()],
        should_see_doctor: true,
        ..SummarySections::default()
    }
}
