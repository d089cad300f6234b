//! Date/time normalization for OCR output.
//!
//! Device displays and receipts print dates in a handful of loose formats:
//! full `YYYY-MM-DD`, slashed `YYYY/M/D`, and year-less `MM-DD` / `M/D`
//! (common on devices that only track month and day). Times show up as
//! 24-hour `HH:MM[:SS]` or 12-hour text with an AM/PM marker. Everything is
//! normalized to zero-padded 24-hour forms; a missing year is inferred as
//! the current calendar year.

use chrono::Datelike;

/// Components recovered from heterogeneous date/time text.
///
/// `None` means the corresponding text was absent or unrecognizable; callers
/// keep the raw string in that case rather than discarding it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateComponents {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    /// Normalized 24-hour `HH:MM` or `HH:MM:SS`.
    pub time: Option<String>,
}

impl DateComponents {
    /// Formatted `YYYY-MM-DD` when all date parts are present.
    pub fn date(&self) -> Option<String> {
        match (self.year, self.month, self.day) {
            (Some(y), Some(m), Some(d)) => Some(format!("{y:04}-{m:02}-{d:02}")),
            _ => None,
        }
    }
}

/// Normalize a raw date string, inferring the current year when absent.
pub fn normalize_date(raw: &str) -> DateComponents {
    normalize_date_with_year(raw, chrono::Utc::now().year())
}

/// Normalize a raw time string to 24-hour `HH:MM[:SS]`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let upper = trimmed.to_ascii_uppercase();
    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end_matches(['.', ' ']).trim(), Some(Meridiem::Pm))
    } else if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end_matches(['.', ' ']).trim(), Some(Meridiem::Am))
    } else {
        (upper.as_str(), None)
    };

    let mut parts = clock.split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    let second: Option<u32> = match parts.next() {
        Some(s) => Some(s.trim().parse().ok()?),
        None => None,
    };
    if parts.next().is_some() || minute > 59 || second.is_some_and(|s| s > 59) {
        return None;
    }

    let hour = match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour + 12,
        Some(Meridiem::Am) if hour == 12 => 0,
        _ => hour,
    };
    if hour > 23 {
        return None;
    }

    Some(match second {
        Some(s) => format!("{hour:02}:{minute:02}:{s:02}"),
        None => format!("{hour:02}:{minute:02}"),
    })
}

enum Meridiem {
    Am,
    Pm,
}

fn normalize_date_with_year(raw: &str, current_year: i32) -> DateComponents {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateComponents::default();
    }

    let fields: Vec<&str> = trimmed.split(['-', '/', '.']).map(str::trim).collect();
    let numbers: Option<Vec<u32>> = fields.iter().map(|f| f.parse().ok()).collect();
    let Some(numbers) = numbers else {
        return DateComponents::default();
    };

    match numbers.as_slice() {
        // YYYY-MM-DD (four-digit leading field distinguishes it from D-M-Y,
        // which none of the supported devices emit)
        [y, m, d] if fields[0].len() == 4 && valid_month_day(*m, *d) => DateComponents {
            year: Some(*y as i32),
            month: Some(*m),
            day: Some(*d),
            time: None,
        },
        // MM-DD / M-D — infer the current calendar year
        [m, d] if valid_month_day(*m, *d) => DateComponents {
            year: Some(current_year),
            month: Some(*m),
            day: Some(*d),
            time: None,
        },
        _ => DateComponents::default(),
    }
}

fn valid_month_day(month: u32, day: u32) -> bool {
    (1..=12).contains(&month) && (1..=31).contains(&day)
}
