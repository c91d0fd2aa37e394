use crate::error::{PlanError, Result};

/// Parse a 12-hour clock time-of-day string into (hour, minute).
///
/// Accepts "9:00 AM", "12:15am", "11:59 PM" — case-insensitive suffix,
/// optional space. "12:00 AM" is midnight, "12:00 PM" is noon.
pub fn parse_time_of_day(s: &str) -> Result<(u32, u32)> {
    let err = || PlanError::InvalidTimeOfDay(s.to_string());

    let compact: String = s.split_whitespace().collect::<Vec<_>>().join("");
    let upper = compact.to_ascii_uppercase();

    let (clock, pm) = if let Some(rest) = upper.strip_suffix("PM") {
        (rest, true)
    } else if let Some(rest) = upper.strip_suffix("AM") {
        (rest, false)
    } else {
        return Err(err());
    };

    let (h, m) = clock.split_once(':').ok_or_else(err)?;
    let hour: u32 = h.parse().map_err(|_| err())?;
    let minute: u32 = m.parse().map_err(|_| err())?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(err());
    }

    let hour24 = match (hour, pm) {
        (12, false) => 0,     // 12:xx AM is midnight
        (12, true) => 12,     // 12:xx PM is noon
        (h, false) => h,
        (h, true) => h + 12,
    };
    Ok((hour24, minute))
}

/// Lowercase weekday name for pattern lookups.
pub fn weekday_name(day: chrono::Weekday) -> &'static str {
    match day {
        chrono::Weekday::Mon => "monday",
        chrono::Weekday::Tue => "tuesday",
        chrono::Weekday::Wed => "wednesday",
        chrono::Weekday::Thu => "thursday",
        chrono::Weekday::Fri => "friday",
        chrono::Weekday::Sat => "saturday",
        chrono::Weekday::Sun => "sunday",
    }
}

/// Whether `name` is a valid lowercase weekday key.
pub fn is_weekday_name(name: &str) -> bool {
    matches!(
        name,
        "monday" | "tuesday" | "wednesday" | "thursday" | "friday" | "saturday" | "sunday"
    )
}
