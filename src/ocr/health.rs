//! Health-device OCR domain — typed readings recovered from a photo of a
//! device display.
//!
//! The model reply is normalized into a `DeviceReading`, an explicit sum
//! type discriminated by `deviceType` on the wire. Every numeric field is
//! optional: a value the model could not read (or that fails the
//! plausibility check) is `null`, and the record as a whole stays valid.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::datetime::{normalize_date, normalize_time};
use super::extract::extract_json;
use super::validate::validate_reading;
use crate::model::{GenerateRequest, GenerativeClient, ModelError};

/// Prompt sent with every device photo. The strict-JSON instruction is a
/// prompt-level contract only; parsing still defends against prose and
/// fencing.
const HEALTH_OCR_PROMPT: &str = r#"Analyze this photo of a health device display. Identify the device type and extract the readings shown.

Supported device types:
1. Blood pressure monitor - systolic (SYS), diastolic (DIA), pulse (PULSE)
2. Height/weight scale - height, weight
3. Blood glucose meter - glucose reading
4. Body fat scale - body fat percentage
5. Pulse oximeter - SpO2 saturation, pulse

Instructions:
1. Decide the device type first.
2. Read the digits on the screen carefully.
3. Extract the measurement date and time if the display shows them.
4. Important: identify and return the units:
   - heightUnit: "cm" | "ft" | "in"
   - weightUnit: "kg" | "lbs"
   - glucoseUnit: "mg/dL" | "mmol/L"

Return format (pure JSON, no markdown wrapper):

Blood pressure monitor:
{"deviceType": "blood_pressure", "bloodPressure": {"systolic": 120, "diastolic": 80, "pulse": 75}, "date": "2024-01-15", "time": "09:30"}

Height/weight scale:
{"deviceType": "body_measurement", "bodyMeasurement": {"height": 170.5, "heightUnit": "cm", "weight": 65.2, "weightUnit": "kg"}, "date": "2024-01-15", "time": "09:30"}

Blood glucose meter:
{"deviceType": "blood_glucose", "bloodGlucose": {"glucose": 98, "unit": "mg/dL"}, "date": "2024-01-15", "time": "09:30"}

Body fat scale:
{"deviceType": "body_fat", "bodyFat": {"percentage": 22.5}, "date": "2024-01-15", "time": "09:30"}

Pulse oximeter:
{"deviceType": "blood_oxygen", "bloodOxygen": {"saturation": 97, "pulse": 72}, "date": "2024-01-15", "time": "09:30"}

Unrecognizable device:
{"deviceType": "unknown"}

Values must be JSON numbers, not quoted strings. If a value cannot be read, set it to null. Return only the JSON, no other text."#;

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    Cm,
    Ft,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    Kg,
    Lbs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlucoseUnit {
    #[serde(rename = "mg/dL")]
    MgDl,
    #[serde(rename = "mmol/L")]
    MmolL,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub pulse: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyMeasurement {
    pub height: Option<f64>,
    pub height_unit: Option<HeightUnit>,
    pub weight: Option<f64>,
    pub weight_unit: Option<WeightUnit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodGlucose {
    pub glucose: Option<f64>,
    pub unit: Option<GlucoseUnit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyFat {
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BloodOxygen {
    pub saturation: Option<f64>,
    pub pulse: Option<f64>,
}

/// One reading per supported device, discriminated by `deviceType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "deviceType", rename_all = "snake_case")]
pub enum DeviceReading {
    BloodPressure {
        #[serde(rename = "bloodPressure")]
        blood_pressure: BloodPressure,
    },
    BodyMeasurement {
        #[serde(rename = "bodyMeasurement")]
        body_measurement: BodyMeasurement,
    },
    BloodGlucose {
        #[serde(rename = "bloodGlucose")]
        blood_glucose: BloodGlucose,
    },
    BodyFat {
        #[serde(rename = "bodyFat")]
        body_fat: BodyFat,
    },
    BloodOxygen {
        #[serde(rename = "bloodOxygen")]
        blood_oxygen: BloodOxygen,
    },
    Unknown,
}

/// Result returned to the caller for one device photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthOcrResult {
    pub success: bool,
    #[serde(flatten)]
    pub reading: DeviceReading,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "rawText")]
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HealthOcrResult {
    /// Defaulted record used for request-validation and internal failures.
    pub fn failed(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            reading: DeviceReading::Unknown,
            date: None,
            time: None,
            raw_text: String::new(),
            error: Some(error.into()),
            message: Some(message.into()),
        }
    }
}

// ──────────────────────────────────────────────
// OCR pipeline
// ──────────────────────────────────────────────

/// Run health-device OCR for one base64 image.
///
/// Errors only when the model call itself fails; an unparsable reply
/// degrades to an `unknown` reading.
pub async fn process_health_ocr(
    client: &dyn GenerativeClient,
    image_base64: &str,
) -> Result<HealthOcrResult, ModelError> {
    let text = client
        .generate(GenerateRequest {
            prompt: HEALTH_OCR_PROMPT.to_string(),
            image: Some(image_base64.to_string()),
            temperature: 0.1,
        })
        .await?;

    Ok(parse_health_response(&text))
}

/// Normalize a raw model reply into a validated `HealthOcrResult`.
pub fn parse_health_response(text: &str) -> HealthOcrResult {
    let (reading, date, time) = match extract_json(text) {
        Ok(payload) => {
            let reading = normalize_reading(&payload);
            let date = normalize_date_field(&payload, "date");
            let time = normalize_time_field(&payload, "time");
            (reading, date, time)
        }
        Err(_) => {
            tracing::warn!(raw_len = text.len(), "health OCR reply had no parsable JSON");
            (DeviceReading::Unknown, None, None)
        }
    };

    HealthOcrResult {
        success: true,
        reading: validate_reading(reading),
        date,
        time,
        raw_text: text.to_string(),
        error: None,
        message: None,
    }
}

/// Map the extracted payload onto a `DeviceReading`.
///
/// An unknown or missing `deviceType` — or a known type with its data block
/// absent — collapses to `Unknown` rather than failing.
fn normalize_reading(payload: &Value) -> DeviceReading {
    match payload.get("deviceType").and_then(Value::as_str) {
        Some("blood_pressure") => match payload.get("bloodPressure") {
            Some(block) => DeviceReading::BloodPressure {
                blood_pressure: BloodPressure {
                    systolic: num_field(block, "systolic"),
                    diastolic: num_field(block, "diastolic"),
                    pulse: num_field(block, "pulse"),
                },
            },
            None => DeviceReading::Unknown,
        },
        Some("body_measurement") => match payload.get("bodyMeasurement") {
            Some(block) => DeviceReading::BodyMeasurement {
                body_measurement: BodyMeasurement {
                    height: num_field(block, "height"),
                    height_unit: unit_field(block, "heightUnit"),
                    weight: num_field(block, "weight"),
                    weight_unit: unit_field(block, "weightUnit"),
                },
            },
            None => DeviceReading::Unknown,
        },
        Some("blood_glucose") => match payload.get("bloodGlucose") {
            Some(block) => DeviceReading::BloodGlucose {
                blood_glucose: BloodGlucose {
                    glucose: num_field(block, "glucose"),
                    unit: unit_field(block, "unit"),
                },
            },
            None => DeviceReading::Unknown,
        },
        Some("body_fat") => match payload.get("bodyFat") {
            Some(block) => DeviceReading::BodyFat {
                body_fat: BodyFat {
                    percentage: num_field(block, "percentage"),
                },
            },
            None => DeviceReading::Unknown,
        },
        Some("blood_oxygen") => match payload.get("bloodOxygen") {
            Some(block) => DeviceReading::BloodOxygen {
                blood_oxygen: BloodOxygen {
                    saturation: num_field(block, "saturation"),
                    pulse: num_field(block, "pulse"),
                },
            },
            None => DeviceReading::Unknown,
        },
        _ => DeviceReading::Unknown,
    }
}

/// Numeric field, tolerating quoted numbers ("120") from sloppier models.
fn num_field(block: &Value, key: &str) -> Option<f64> {
    match block.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Enum-typed field; values outside the unit enumeration become `None`.
fn unit_field<U: serde::de::DeserializeOwned>(block: &Value, key: &str) -> Option<U> {
    serde_json::from_value(block.get(key)?.clone()).ok()
}

fn normalize_date_field(payload: &Value, key: &str) -> Option<String> {
    let raw = payload.get(key)?.as_str()?;
    if raw.trim().is_empty() {
        return None;
    }
    // Keep the raw text when it doesn't match any supported layout.
    Some(normalize_date(raw).date().unwrap_or_else(|| raw.to_string()))
}

fn normalize_time_field(payload: &Value, key: &str) -> Option<String> {
    let raw = payload.get(key)?.as_str()?;
    if raw.trim().is_empty() {
        return None;
    }
    Some(normalize_time(raw).unwrap_or_else(|| raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blood_pressure_reply() {
        let text = r#"{"deviceType": "blood_pressure", "bloodPressure": {"systolic": 130, "diastolic": 85, "pulse": 72}, "date": "2024-01-15", "time": "09:30"}"#;
        let result = parse_health_response(text);

        assert!(result.success);
        assert_eq!(
            result.reading,
            DeviceReading::BloodPressure {
                blood_pressure: BloodPressure {
                    systolic: Some(130.0),
                    diastolic: Some(85.0),
                    pulse: Some(72.0),
                },
            }
        );
        assert_eq!(result.date.as_deref(), Some("2024-01-15"));
        assert_eq!(result.time.as_deref(), Some("09:30"));
    }

    #[test]
    fn parses_fenced_body_measurement_reply() {
        let text = "```json\n{\"deviceType\": \"body_measurement\", \"bodyMeasurement\": {\"height\": 5.7, \"heightUnit\": \"ft\", \"weight\": 154, \"weightUnit\": \"lbs\"}}\n```";
        let result = parse_health_response(text);

        match result.reading {
            DeviceReading::BodyMeasurement { body_measurement } => {
                assert_eq!(body_measurement.height, Some(5.7));
                assert_eq!(body_measurement.height_unit, Some(HeightUnit::Ft));
                assert_eq!(body_measurement.weight_unit, Some(WeightUnit::Lbs));
            }
            other => panic!("expected body_measurement, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_reply_degrades_to_unknown() {
        let result = parse_health_response("The display is too blurry to read.");
        assert!(result.success);
        assert_eq!(result.reading, DeviceReading::Unknown);
        assert_eq!(result.raw_text, "The display is too blurry to read.");
        assert!(result.date.is_none());
    }

    #[test]
    fn missing_data_block_degrades_to_unknown() {
        let result = parse_health_response(r#"{"deviceType": "blood_pressure"}"#);
        assert_eq!(result.reading, DeviceReading::Unknown);
    }

    #[test]
    fn unknown_device_type_string_degrades_to_unknown() {
        let result =
            parse_health_response(r#"{"deviceType": "thermometer", "value": 38.2}"#);
        assert_eq!(result.reading, DeviceReading::Unknown);
    }

    #[test]
    fn quoted_numbers_are_tolerated() {
        let text = r#"{"deviceType": "blood_oxygen", "bloodOxygen": {"saturation": "97", "pulse": "72"}}"#;
        match parse_health_response(text).reading {
            DeviceReading::BloodOxygen { blood_oxygen } => {
                assert_eq!(blood_oxygen.saturation, Some(97.0));
                assert_eq!(blood_oxygen.pulse, Some(72.0));
            }
            other => panic!("expected blood_oxygen, got {other:?}"),
        }
    }

    #[test]
    fn invalid_unit_becomes_none() {
        let text = r#"{"deviceType": "body_measurement", "bodyMeasurement": {"height": 170, "heightUnit": "meters", "weight": 60, "weightUnit": "kg"}}"#;
        match parse_health_response(text).reading {
            DeviceReading::BodyMeasurement { body_measurement } => {
                assert_eq!(body_measurement.height_unit, None);
                assert_eq!(body_measurement.weight_unit, Some(WeightUnit::Kg));
            }
            other => panic!("expected body_measurement, got {other:?}"),
        }
    }

    #[test]
    fn twelve_hour_time_is_normalized() {
        let text = r#"{"deviceType": "blood_glucose", "bloodGlucose": {"glucose": 98, "unit": "mg/dL"}, "date": "01-15", "time": "01:00 PM"}"#;
        let result = parse_health_response(text);
        assert_eq!(result.time.as_deref(), Some("13:00"));
        assert!(result.date.as_deref().unwrap().ends_with("-01-15"));
    }

    #[test]
    fn serializes_with_device_type_tag() {
        let result = parse_health_response(
            r#"{"deviceType": "body_fat", "bodyFat": {"percentage": 22.5}}"#,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["deviceType"], "body_fat");
        assert_eq!(json["bodyFat"]["percentage"], 22.5);
        assert_eq!(json["success"], true);
        assert!(json.get("bloodPressure").is_none());
    }

    #[test]
    fn unknown_serializes_without_data_blocks() {
        let json = serde_json::to_value(HealthOcrResult::failed(
            "Missing image data",
            "Please provide an image in base64 format",
        ))
        .unwrap();
        assert_eq!(json["deviceType"], "unknown");
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Missing image data");
        assert!(json["message"].as_str().unwrap().contains("base64"));
    }

    #[test]
    fn glucose_unit_round_trips_wire_names() {
        let unit: GlucoseUnit = serde_json::from_str("\"mmol/L\"").unwrap();
        assert_eq!(unit, GlucoseUnit::MmolL);
        assert_eq!(serde_json::to_string(&GlucoseUnit::MgDl).unwrap(), "\"mg/dL\"");
    }
}
