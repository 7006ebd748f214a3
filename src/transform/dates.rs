use chrono::{DateTime, Datelike, Locale, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const DATE_UNAVAILABLE: &str = "Fecha no disponible";
pub const DATE_INVALID: &str = "Fecha no válida";

/// A certificate date parsed from the document.
///
/// `instant` orders records; `calendar` is the day as written, shown to the
/// reader without any timezone shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParsedDate {
    pub instant: DateTime<Utc>,
    pub calendar: NaiveDate,
}

/// Parses the ISO-8601 shapes a data file realistically contains: full
/// RFC 3339 timestamps, local date-times, plain dates, year-month and bare
/// years.
pub fn parse_date(raw: &str) -> Option<ParsedDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(ParsedDate {
            instant: dt.with_timezone(&Utc),
            calendar: dt.date_naive(),
        });
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ParsedDate {
                instant: Utc.from_utc_datetime(&ndt),
                calendar: ndt.date(),
            });
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok())
        .or_else(|| {
            if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
                raw.parse::<i32>()
                    .ok()
                    .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            } else {
                None
            }
        })?;

    Some(ParsedDate {
        instant: Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?),
        calendar: date,
    })
}

/// Long-form `es-ES` calendar date, e.g. `15 de junio de 2024`.
pub fn format_long(date: NaiveDate) -> String {
    let midnight = match date.and_hms_opt(0, 0, 0) {
        Some(ndt) => Utc.from_utc_datetime(&ndt),
        None => return format!("{}", date.day()),
    };
    midnight
        .format_localized("%-d de %B de %Y", Locale::es_ES)
        .to_string()
}

/// Display label for an optional raw date.
pub fn date_label(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DATE_UNAVAILABLE.to_string(),
        Some(value) => match parse_date(value) {
            Some(parsed) => format_long(parsed.calendar),
            None => DATE_INVALID.to_string(),
        },
    }
}
