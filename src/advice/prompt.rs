//! Prompt construction for advice/summary generation.
//!
//! The prompt renders the client-supplied metric blocks into a compact
//! data section, appends the clinical reference tables the model should
//! grade against, and pins the output to a strict JSON shape. The strict
//! shape is a prompt-level contract only — parsing still defends against
//! prose and fencing.

use std::fmt::Write as _;

use super::types::{HealthData, UserProfile};

/// Default reply language when the client doesn't send one.
pub const DEFAULT_LANGUAGE: &str = "zh-TW";

const REFERENCES: &str = r#"
## Clinical reference standards

### Blood pressure (mmHg)
| Grade                 | Systolic | Diastolic | level    |
|-----------------------|----------|-----------|----------|
| Normal                | < 120    | < 80      | normal   |
| Elevated              | 120-129  | < 80      | elevated |
| Hypertension stage 1  | 130-139  | 80-89     | high     |
| Hypertension stage 2  | >= 140   | >= 90     | high     |
| Hypertensive crisis   | > 180    | > 120     | critical |

### Heart rate (bpm)
| Grade    | Range    | level    |
|----------|----------|----------|
| Low      | < 60     | elevated |
| Normal   | 60-100   | normal   |
| Elevated | 100-120  | elevated |
| High     | > 120    | high     |

### Blood glucose (mg/dL)
| Type         | Normal | Elevated | Diabetic |
|--------------|--------|----------|----------|
| Fasting      | < 100  | 100-125  | >= 126   |
| Postprandial | < 140  | 140-199  | >= 200   |

### Body fat (%)
| Grade      | Male   | Female | level    |
|------------|--------|--------|----------|
| Too low    | < 6    | < 14   | elevated |
| Athlete    | 6-13   | 14-20  | normal   |
| Fit        | 14-17  | 21-24  | normal   |
| Acceptable | 18-24  | 25-31  | elevated |
| High       | > 25   | > 32   | high     |

### Blood oxygen (SpO2 %)
| Grade          | Range   | level    |
|----------------|---------|----------|
| Normal         | 95-100  | normal   |
| Low            | 90-94   | elevated |
| Hypoxemia      | < 90    | high     |
| Severe hypoxemia | < 85  | critical |"#;

const COLOR_CODES: &str =
    "Color codes: normal=#4CAF50, elevated=#FFA500, high=#FF5722, critical=#F44336";

/// Human name of the reply language for the prompt.
fn reply_language(language: &str) -> &'static str {
    if language == DEFAULT_LANGUAGE {
        "Traditional Chinese"
    } else {
        "English"
    }
}

/// Disclaimer appended to every advice/summary response.
pub fn disclaimer(language: &str) -> String {
    if language == DEFAULT_LANGUAGE {
        "此建議由 AI 生成，僅供參考，不能替代專業醫療診斷。如有健康疑慮，請諮詢醫生。".to_string()
    } else {
        "This advice is AI-generated for reference only and cannot replace professional \
         medical diagnosis. Please consult a doctor if you have health concerns."
            .to_string()
    }
}

/// Client-facing message when the model call fails.
pub fn ai_error_message(language: &str) -> String {
    if language == DEFAULT_LANGUAGE {
        "無法生成健康建議".to_string()
    } else {
        "Unable to generate health advice".to_string()
    }
}

/// Render the user profile section.
fn profile_section(profile: Option<&UserProfile>) -> String {
    match profile.and_then(|p| serde_json::to_string_pretty(p).ok()) {
        Some(json) => json,
        None => "not provided".to_string(),
    }
}

/// Render every populated metric block into prompt text.
fn data_sections(data: &HealthData) -> String {
    let mut out = String::new();

    if let Some(bp) = data.blood_pressure.as_ref().filter(|b| b.record_count > 0) {
        let _ = writeln!(out, "### Blood pressure ({} records)", bp.record_count);
        if let Some(latest) = &bp.latest {
            let _ = write!(out, "- latest: {}/{} mmHg", latest.systolic, latest.diastolic);
            if let Some(pulse) = latest.pulse {
                let _ = write!(out, ", pulse {pulse} bpm");
            }
            let _ = writeln!(out, " ({})", latest.timestamp);
        }
        if let (Some(avg_sys), Some(avg_dia)) = (bp.avg_systolic, bp.avg_diastolic) {
            let _ = writeln!(out, "- average: {avg_sys:.0}/{avg_dia:.0} mmHg");
        }
        if let (Some(min), Some(max)) = (bp.min_systolic, bp.max_systolic) {
            let _ = writeln!(out, "- systolic range: {min} ~ {max} mmHg");
        }
        for (i, r) in bp.recent_records.iter().enumerate() {
            let _ = write!(out, "{}. {}/{} mmHg", i + 1, r.systolic, r.diastolic);
            if let Some(pulse) = r.pulse {
                let _ = write!(out, ", pulse {pulse} bpm");
            }
            let _ = writeln!(out, " ({})", r.timestamp);
        }
        out.push('\n');
    }

    if let Some(hr) = data.heart_rate.as_ref().filter(|b| b.record_count > 0) {
        let _ = writeln!(out, "### Heart rate ({} records)", hr.record_count);
        if let Some(latest) = &hr.latest {
            let _ = writeln!(
                out,
                "- latest: {} bpm ({})",
                latest.value,
                latest.timestamp.as_deref().unwrap_or("-")
            );
        }
        if let Some(avg) = hr.avg {
            let _ = writeln!(out, "- average: {avg:.0} bpm");
        }
        if let (Some(min), Some(max)) = (hr.min, hr.max) {
            let _ = writeln!(out, "- range: {min} ~ {max} bpm");
        }
        for (i, r) in hr.recent_records.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {} bpm ({})",
                i + 1,
                r.value,
                r.timestamp.as_deref().unwrap_or("-")
            );
        }
        out.push('\n');
    }

    if let Some(bg) = data.blood_glucose.as_ref().filter(|b| b.record_count > 0) {
        let _ = writeln!(out, "### Blood glucose ({} records)", bg.record_count);
        if let Some(latest) = &bg.latest {
            let _ = write!(out, "- latest: {} mg/dL", latest.value);
            if let Some(t) = &latest.reading_type {
                let _ = write!(out, " ({t})");
            }
            let _ = writeln!(out, " ({})", latest.timestamp.as_deref().unwrap_or("-"));
        }
        if let Some(avg) = bg.avg {
            let _ = writeln!(out, "- average: {avg:.0} mg/dL");
        }
        for (i, r) in bg.recent_records.iter().enumerate() {
            let _ = write!(out, "{}. {} mg/dL", i + 1, r.value);
            if let Some(t) = &r.reading_type {
                let _ = write!(out, " ({t})");
            }
            let _ = writeln!(out, " ({})", r.timestamp.as_deref().unwrap_or("-"));
        }
        out.push('\n');
    }

    if let Some(bf) = data.body_fat.as_ref().filter(|b| b.record_count > 0) {
        let _ = writeln!(out, "### Body fat ({} records)", bf.record_count);
        if let Some(avg) = bf.avg {
            let _ = writeln!(out, "- average: {avg:.1}%");
        }
        if let (Some(min), Some(max)) = (bf.min, bf.max) {
            let _ = writeln!(out, "- range: {min:.1}% ~ {max:.1}%");
        }
        for (i, r) in bf.recent_records.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}. {:.1}% ({})",
                i + 1,
                r.percentage,
                r.timestamp.as_deref().unwrap_or("-")
            );
        }
        out.push('\n');
    }

    if let Some(bo) = data.blood_oxygen.as_ref().filter(|b| b.record_count > 0) {
        let _ = writeln!(out, "### Blood oxygen ({} records)", bo.record_count);
        if let Some(avg) = bo.avg {
            let _ = writeln!(out, "- average: {avg:.1}%");
        }
        if let (Some(min), Some(max)) = (bo.min, bo.max) {
            let _ = writeln!(out, "- range: {min:.0}% ~ {max:.0}%");
        }
        for (i, r) in bo.recent_records.iter().enumerate() {
            let _ = write!(out, "{}. {:.0}%", i + 1, r.saturation);
            if let Some(pulse) = r.pulse {
                let _ = write!(out, ", pulse {pulse:.0} bpm");
            }
            let _ = writeln!(out, " ({})", r.timestamp.as_deref().unwrap_or("-"));
        }
        out.push('\n');
    }

    out
}

/// Prompt for the health-advice endpoint.
pub fn build_advice_prompt(
    language: &str,
    profile: Option<&UserProfile>,
    data: &HealthData,
) -> String {
    format!(
        r##"You are a professional health advisor AI. Provide comprehensive advice based on the health data below.

## User profile
{profile}

## Health data
{data}{references}

## Requirements
1. Reply in {lang}.
2. Assess all provided health data together.
3. Grade the overall health level: normal, elevated, high, or critical.
4. Give concrete, actionable advice.
5. If any value is abnormal, explain it under warnings and recommend seeing a doctor.
6. {colors}

## Reply format (strict JSON)
{{
  "status": {{
    "level": "normal|elevated|high|critical",
    "title": "overall status title",
    "description": "combined assessment covering each metric briefly",
    "color": "#hex"
  }},
  "advice": {{
    "summary": "short summary (under 50 words)",
    "details": ["analysis 1", "analysis 2"],
    "lifestyle": ["lifestyle tip 1"],
    "dietary": ["dietary tip 1"],
    "warnings": ["warnings, empty array if none"],
    "should_see_doctor": false
  }}
}}

Output only the JSON, no other text."##,
        profile = profile_section(profile),
        data = data_sections(data),
        references = REFERENCES,
        lang = reply_language(language),
        colors = COLOR_CODES,
    )
}

/// Prompt for the health-summary endpoint. When the request carries only a
/// free-text note, the prompt switches to focused question answering.
pub fn build_summary_prompt(
    language: &str,
    profile: Option<&UserProfile>,
    data: &HealthData,
    custom_note: Option<&str>,
) -> String {
    let note = custom_note.map(str::trim).filter(|n| !n.is_empty());
    let sections = data_sections(data);

    if sections.is_empty() {
        if let Some(note) = note {
            return build_note_only_prompt(language, profile, note);
        }
    }

    let note_section = note
        .map(|n| format!("\n## User note\n{n}\n"))
        .unwrap_or_default();

    format!(
        r##"You are a professional health data analyst AI. Provide a combined summary of the health data below.

## User profile
{profile}
{note_section}
## Health data
{data}{references}

## Requirements
1. Reply in {lang}.
2. Assess all provided health data together and note trends across the listed records.
3. Grade the overall health level: normal, elevated, high, or critical.
4. Give concrete, actionable daily-life tips.
5. If any value is abnormal or trending worse, explain it under warnings and suggest considering a doctor visit.
6. {colors}

## Reply format (strict JSON)
{{
  "status": {{
    "level": "normal|elevated|high|critical",
    "title": "overall status title",
    "description": "combined assessment covering each metric briefly",
    "color": "#hex"
  }},
  "summary": {{
    "overview": "short overview (under 50 words)",
    "details": ["analysis 1", "analysis 2"],
    "lifestyle": ["daily tip 1"],
    "dietary": ["dietary tip 1"],
    "warnings": ["cautions, empty array if none"],
    "should_see_doctor": false
  }}
}}

Output only the JSON, no other text."##,
        profile = profile_section(profile),
        note_section = note_section,
        data = sections,
        references = REFERENCES,
        lang = reply_language(language),
        colors = COLOR_CODES,
    )
}

fn build_note_only_prompt(language: &str, profile: Option<&UserProfile>, note: &str) -> String {
    format!(
        r##"You are a professional health consultation AI. The user asked a health question; answer it directly.

## User profile
{profile}

## User question
{note}
{references}

## Ground rules
1. Answer only what the user actually asked; do not branch into other health topics.
2. For a simple data question ("is my height normal"), answer that question and stop.
3. Do not volunteer analysis of metrics the user didn't ask about.
4. Only give lifestyle/dietary tips when the question or described symptoms call for them.
5. For a simple question, 1-2 details are enough; lifestyle/dietary/warnings may be empty arrays.

## Requirements
1. Reply in {lang}.
2. Grade the level: normal (general info), elevated (needs attention), high (see a doctor), critical (urgent).
3. {colors}

## Reply format (strict JSON)
{{
  "status": {{
    "level": "normal|elevated|high|critical",
    "title": "concise answer title",
    "description": "direct answer to the question",
    "color": "#hex"
  }},
  "summary": {{
    "overview": "one-sentence answer",
    "details": ["supporting explanation (1-3 items)"],
    "lifestyle": ["only when relevant, else empty"],
    "dietary": ["only when relevant, else empty"],
    "warnings": ["only when necessary, else empty"],
    "should_see_doctor": false
  }}
}}

Output only the JSON, no other text."##,
        profile = profile_section(profile),
        note = note,
        references = REFERENCES,
        lang = reply_language(language),
        colors = COLOR_CODES,
    )
}
