//! Wire types for the health-advice and health-summary endpoints.
//!
//! Requests carry pre-aggregated metric blocks computed by the client (the
//! server never stores health history). Field aliases accept the older
//! per-route spellings (`avg_systolic_7days` vs `avg_systolic`) so both
//! endpoint generations share one type family.

use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Requests
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_hypertension: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_diabetes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_heart_disease: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_high_cholesterol: Option<bool>,
    /// CDC/SNOMED CT smoking status buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoking_status: Option<String>,
    /// WHO AUDIT-C drinking frequency buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drinking_frequency: Option<String>,
    /// WHO 2020 physical activity buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_activity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_smoker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_frequency: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BloodPressureRecord {
    pub systolic: f64,
    pub diastolic: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<f64>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValueRecord {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlucoseRecord {
    pub value: f64,
    /// `fasting` | `postprandial` | `random`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub reading_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BodyFatRecord {
    pub percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BloodOxygenRecord {
    pub saturation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BloodPressureData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<BloodPressureRecord>,
    #[serde(alias = "avg_systolic_7days", skip_serializing_if = "Option::is_none")]
    pub avg_systolic: Option<f64>,
    #[serde(alias = "avg_diastolic_7days", skip_serializing_if = "Option::is_none")]
    pub avg_diastolic: Option<f64>,
    #[serde(alias = "min_systolic_7days", skip_serializing_if = "Option::is_none")]
    pub min_systolic: Option<f64>,
    #[serde(alias = "max_systolic_7days", skip_serializing_if = "Option::is_none")]
    pub max_systolic: Option<f64>,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_records: Vec<BloodPressureRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HeartRateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<ValueRecord>,
    #[serde(alias = "avg_7days", skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(alias = "min_7days", skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(alias = "max_7days", skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_records: Vec<ValueRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BloodGlucoseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<GlucoseRecord>,
    #[serde(alias = "avg_7days", skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_records: Vec<GlucoseRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BodyFatData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_records: Vec<BodyFatRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BloodOxygenData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_records: Vec<BloodOxygenRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HealthData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressureData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<HeartRateData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_glucose: Option<BloodGlucoseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<BodyFatData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_oxygen: Option<BloodOxygenData>,
}

impl HealthData {
    /// Metric blocks that actually carry records, in canonical order.
    pub fn analyzed_types(&self) -> Vec<&'static str> {
        let mut types = Vec::new();
        if self.blood_pressure.as_ref().is_some_and(|b| b.record_count > 0) {
            types.push("blood_pressure");
        }
        if self.heart_rate.as_ref().is_some_and(|b| b.record_count > 0) {
            types.push("heart_rate");
        }
        if self.blood_glucose.as_ref().is_some_and(|b| b.record_count > 0) {
            types.push("blood_glucose");
        }
        if self.body_fat.as_ref().is_some_and(|b| b.record_count > 0) {
            types.push("body_fat");
        }
        if self.blood_oxygen.as_ref().is_some_and(|b| b.record_count > 0) {
            types.push("blood_oxygen");
        }
        types
    }

    pub fn has_analyzable_data(&self) -> bool {
        !self.analyzed_types().is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthAdviceRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub health_data: Option<HealthData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthSummaryRequest {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub health_data: Option<HealthData>,
    #[serde(default)]
    pub custom_note: Option<String>,
    // Client telemetry, passed through to the log store only.
    #[serde(default)]
    pub remaining_credits: Option<i64>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub client_info: Option<serde_json::Value>,
}

// ──────────────────────────────────────────────
// Responses
// ──────────────────────────────────────────────

/// Overall assessment level. Unknown strings from the model collapse to
/// `Normal` at parse time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    #[default]
    Normal,
    Elevated,
    High,
    Critical,
}

impl StatusLevel {
    /// Display color matching the mobile clients' palette.
    pub fn default_color(self) -> &'static str {
        match self {
            StatusLevel::Normal => "#4CAF50",
            StatusLevel::Elevated => "#FFA500",
            StatusLevel::High => "#FF5722",
            StatusLevel::Critical => "#F44336",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub level: StatusLevel,
    pub title: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdviceSections {
    pub summary: String,
    pub details: Vec<String>,
    pub lifestyle: Vec<String>,
    pub dietary: Vec<String>,
    pub warnings: Vec<String>,
    pub should_see_doctor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummarySections {
    pub overview: String,
    pub details: Vec<String>,
    pub lifestyle: Vec<String>,
    pub dietary: Vec<String>,
    pub warnings: Vec<String>,
    pub should_see_doctor: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdviceResponse {
    pub success: bool,
    pub analyzed_types: Vec<String>,
    pub status: HealthStatus,
    pub advice: AdviceSections,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub analyzed_types: Vec<String>,
    pub status: HealthStatus,
    pub summary: SummarySections,
    pub disclaimer: String,
}

/// Body returned (still HTTP 200) when the model call itself fails.
#[derive(Debug, Clone, Serialize)]
pub struct AiFailure {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    pub disclaimer: String,
}

/// Outcome of an advice generation: a structured result or a degraded
/// AI-failure body. Serialized untagged — the two shapes are disjoint.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AdviceOutcome {
    Generated(AdviceResponse),
    Failed(AiFailure),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SummaryOutcome {
    Generated(SummaryResponse),
    Failed(AiFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_level_parses_lowercase_wire_names() {
        let level: StatusLevel = serde_json::from_str("\"elevated\"").unwrap();
        assert_eq!(level, StatusLevel::Elevated);
        assert_eq!(serde_json::to_string(&StatusLevel::Critical).unwrap(), "\"critical\"");
    }

    #[test]
    fn health_data_reports_analyzed_types_in_order() {
        let data: HealthData = serde_json::from_value(serde_json::json!({
            "blood_oxygen": {"record_count": 2},
            "blood_pressure": {"record_count": 1},
            "heart_rate": {"record_count": 0}
        }))
        .unwrap();
        assert_eq!(data.analyzed_types(), vec!["blood_pressure", "blood_oxygen"]);
        assert!(data.has_analyzable_data());
    }

    #[test]
    fn empty_health_data_has_nothing_to_analyze() {
        let data = HealthData::default();
        assert!(!data.has_analyzable_data());
    }

    #[test]
    fn seven_day_aliases_are_accepted() {
        let data: BloodPressureData = serde_json::from_value(serde_json::json!({
            "latest": {"systolic": 128, "diastolic": 82, "pulse": 70, "timestamp": "2026-01-02T08:00:00Z"},
            "avg_systolic_7days": 126.0,
            "avg_diastolic_7days": 81.0,
            "record_count": 7
        }))
        .unwrap();
        assert_eq!(data.avg_systolic, Some(126.0));
        assert_eq!(data.latest.unwrap().systolic, 128.0);
    }

    #[test]
    fn glucose_record_maps_type_keyword() {
        let record: GlucoseRecord = serde_json::from_value(serde_json::json!({
            "value": 98, "type": "fasting", "timestamp": "2026-01-02T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(record.reading_type.as_deref(), Some("fasting"));
    }

    #[test]
    fn levels_map_to_palette_colors() {
        assert_eq!(StatusLevel::Normal.default_color(), "#4CAF50");
        assert_eq!(StatusLevel::Critical.default_color(), "#F44336");
    }
}
