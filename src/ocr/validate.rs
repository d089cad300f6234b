//! Plausibility validation for device readings.
//!
//! Bounds are deliberately wide: they cover pathological extremes so the
//! filter only catches OCR garbage (a misread digit turning 140 into 1140),
//! never clinically-unusual-but-real values. Validation is field-level — an
//! implausible field becomes `null`, the rest of the record survives.

use super::health::{DeviceReading, GlucoseUnit, HeightUnit, WeightUnit};

const SYSTOLIC_MMHG: (f64, f64) = (50.0, 300.0);
const DIASTOLIC_MMHG: (f64, f64) = (30.0, 180.0);
const PULSE_BPM: (f64, f64) = (30.0, 220.0);
const HEIGHT_CM: (f64, f64) = (40.0, 280.0);
const WEIGHT_KG: (f64, f64) = (1.0, 650.0);
const GLUCOSE_MG_DL: (f64, f64) = (20.0, 800.0);
const GLUCOSE_MMOL_L: (f64, f64) = (1.1, 44.4);
const BODY_FAT_PCT: (f64, f64) = (1.0, 75.0);
const SATURATION_PCT: (f64, f64) = (50.0, 100.0);

const CM_PER_FT: f64 = 30.48;
const CM_PER_IN: f64 = 2.54;
const KG_PER_LB: f64 = 0.453_592_37;

/// Null out any field whose value lies outside its plausible range.
///
/// Idempotent: validating an already-validated reading is a no-op.
pub fn validate_reading(reading: DeviceReading) -> DeviceReading {
    match reading {
        DeviceReading::BloodPressure { mut blood_pressure } => {
            blood_pressure.systolic = bounded(blood_pressure.systolic, SYSTOLIC_MMHG);
            blood_pressure.diastolic = bounded(blood_pressure.diastolic, DIASTOLIC_MMHG);
            blood_pressure.pulse = bounded(blood_pressure.pulse, PULSE_BPM);
            DeviceReading::BloodPressure { blood_pressure }
        }
        DeviceReading::BodyMeasurement { mut body_measurement } => {
            body_measurement.height = bounded_by(
                body_measurement.height,
                HEIGHT_CM,
                height_to_cm(body_measurement.height_unit),
            );
            body_measurement.weight = bounded_by(
                body_measurement.weight,
                WEIGHT_KG,
                weight_to_kg(body_measurement.weight_unit),
            );
            DeviceReading::BodyMeasurement { body_measurement }
        }
        DeviceReading::BloodGlucose { mut blood_glucose } => {
            // A meter that doesn't print its unit is read as mg/dL, the
            // dominant consumer-device convention.
            let bounds = match blood_glucose.unit {
                Some(GlucoseUnit::MmolL) => GLUCOSE_MMOL_L,
                Some(GlucoseUnit::MgDl) | None => GLUCOSE_MG_DL,
            };
            blood_glucose.glucose = bounded(blood_glucose.glucose, bounds);
            DeviceReading::BloodGlucose { blood_glucose }
        }
        DeviceReading::BodyFat { mut body_fat } => {
            body_fat.percentage = bounded(body_fat.percentage, BODY_FAT_PCT);
            DeviceReading::BodyFat { body_fat }
        }
        DeviceReading::BloodOxygen { mut blood_oxygen } => {
            blood_oxygen.saturation = bounded(blood_oxygen.saturation, SATURATION_PCT);
            blood_oxygen.pulse = bounded(blood_oxygen.pulse, PULSE_BPM);
            DeviceReading::BloodOxygen { blood_oxygen }
        }
        DeviceReading::Unknown => DeviceReading::Unknown,
    }
}

fn bounded(value: Option<f64>, (lo, hi): (f64, f64)) -> Option<f64> {
    value.filter(|v| (lo..=hi).contains(v))
}

/// Bounds check in a canonical unit: `convert` maps the displayed value to
/// the unit the bounds are expressed in; the stored value stays as-is.
fn bounded_by(
    value: Option<f64>,
    (lo, hi): (f64, f64),
    convert: impl Fn(f64) -> f64,
) -> Option<f64> {
    value.filter(|v| {
        let canonical = convert(*v);
        (lo..=hi).contains(&canonical)
    })
}

fn height_to_cm(unit: Option<HeightUnit>) -> impl Fn(f64) -> f64 {
    move |v| match unit {
        Some(HeightUnit::Ft) => v * CM_PER_FT,
        Some(HeightUnit::In) => v * CM_PER_IN,
        Some(HeightUnit::Cm) | None => v,
    }
}

fn weight_to_kg(unit: Option<WeightUnit>) -> impl Fn(f64) -> f64 {
    move |v| match unit {
        Some(WeightUnit::Lbs) => v * KG_PER_LB,
        Some(WeightUnit::Kg) | None => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::health::{BloodGlucose, BloodOxygen, BloodPressure, BodyFat, BodyMeasurement};

    fn bp(systolic: f64, diastolic: f64, pulse: f64) -> DeviceReading {
        DeviceReading::BloodPressure {
            blood_pressure: BloodPressure {
                systolic: Some(systolic),
                diastolic: Some(diastolic),
                pulse: Some(pulse),
            },
        }
    }

    #[test]
    fn implausible_systolic_is_nulled_others_kept() {
        let validated = validate_reading(bp(400.0, 80.0, 72.0));
        assert_eq!(
            validated,
            DeviceReading::BloodPressure {
                blood_pressure: BloodPressure {
                    systolic: None,
                    diastolic: Some(80.0),
                    pulse: Some(72.0),
                },
            }
        );
    }

    #[test]
    fn pathological_extremes_survive() {
        // Hypertensive crisis values are real readings, not OCR noise.
        let validated = validate_reading(bp(230.0, 130.0, 40.0));
        assert_eq!(validated, bp(230.0, 130.0, 40.0));
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(validate_reading(bp(50.0, 30.0, 220.0)), bp(50.0, 30.0, 220.0));
        assert_eq!(validate_reading(bp(300.0, 180.0, 30.0)), bp(300.0, 180.0, 30.0));
    }

    #[test]
    fn validation_is_idempotent() {
        let once = validate_reading(bp(400.0, 25.0, 72.0));
        let twice = validate_reading(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn height_bounds_respect_declared_unit() {
        // 5.7 ft ≈ 173.7 cm — plausible; 5.7 raw cm would fail the check.
        let reading = DeviceReading::BodyMeasurement {
            body_measurement: BodyMeasurement {
                height: Some(5.7),
                height_unit: Some(HeightUnit::Ft),
                weight: Some(154.0),
                weight_unit: Some(WeightUnit::Lbs),
            },
        };
        assert_eq!(validate_reading(reading.clone()), reading);

        let cm_reading = DeviceReading::BodyMeasurement {
            body_measurement: BodyMeasurement {
                height: Some(5.7),
                height_unit: Some(HeightUnit::Cm),
                weight: Some(60.0),
                weight_unit: Some(WeightUnit::Kg),
            },
        };
        match validate_reading(cm_reading) {
            DeviceReading::BodyMeasurement { body_measurement } => {
                assert_eq!(body_measurement.height, None);
                assert_eq!(body_measurement.weight, Some(60.0));
            }
            other => panic!("expected body_measurement, got {other:?}"),
        }
    }

    #[test]
    fn weight_in_pounds_converts_before_check() {
        // 1300 lbs ≈ 590 kg — inside [1, 650]; 1300 kg would be out.
        let reading = DeviceReading::BodyMeasurement {
            body_measurement: BodyMeasurement {
                height: None,
                height_unit: None,
                weight: Some(1300.0),
                weight_unit: Some(WeightUnit::Lbs),
            },
        };
        assert_eq!(validate_reading(reading.clone()), reading);
    }

    #[test]
    fn glucose_bounds_switch_on_unit() {
        let mmol = DeviceReading::BloodGlucose {
            blood_glucose: BloodGlucose {
                glucose: Some(5.5),
                unit: Some(GlucoseUnit::MmolL),
            },
        };
        assert_eq!(validate_reading(mmol.clone()), mmol);

        // 5.5 mg/dL is below the mg/dL floor of 20.
        let mg = DeviceReading::BloodGlucose {
            blood_glucose: BloodGlucose {
                glucose: Some(5.5),
                unit: Some(GlucoseUnit::MgDl),
            },
        };
        match validate_reading(mg) {
            DeviceReading::BloodGlucose { blood_glucose } => {
                assert_eq!(blood_glucose.glucose, None)
            }
            other => panic!("expected blood_glucose, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_glucose_unit_uses_mg_dl_bounds() {
        let reading = DeviceReading::BloodGlucose {
            blood_glucose: BloodGlucose {
                glucose: Some(98.0),
                unit: None,
            },
        };
        assert_eq!(validate_reading(reading.clone()), reading);
    }

    #[test]
    fn body_fat_and_saturation_bounds() {
        let fat = DeviceReading::BodyFat {
            body_fat: BodyFat {
                percentage: Some(80.0),
            },
        };
        match validate_reading(fat) {
            DeviceReading::BodyFat { body_fat } => assert_eq!(body_fat.percentage, None),
            other => panic!("expected body_fat, got {other:?}"),
        }

        let oxy = DeviceReading::BloodOxygen {
            blood_oxygen: BloodOxygen {
                saturation: Some(101.0),
                pulse: Some(72.0),
            },
        };
        match validate_reading(oxy) {
            DeviceReading::BloodOxygen { blood_oxygen } => {
                assert_eq!(blood_oxygen.saturation, None);
                assert_eq!(blood_oxygen.pulse, Some(72.0));
            }
            other => panic!("expected blood_oxygen, got {other:?}"),
        }
    }

    #[test]
    fn unknown_passes_through() {
        assert_eq!(validate_reading(DeviceReading::Unknown), DeviceReading::Unknown);
    }
}
