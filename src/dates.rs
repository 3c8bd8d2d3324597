//! Date and duration helpers for forms and list rendering.

use chrono::{Datelike, Duration, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse human-readable due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "mon".."sun" and full weekday names (this week's occurrence)
/// - "next monday", "next fri", ...
/// - "eow" / "end of week", "eom" / "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
pub fn parse_due_on(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = input.trim().to_lowercase();

    match s.as_str() {
        "today" | "tod" => return Some(today),
        "tomorrow" | "tom" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => return Some(start_of_week(today) + Duration::days(6)),
        "end of month" | "eom" => {
            let (y, m) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            return NaiveDate::from_ymd_opt(y, m, 1).map(|d| d - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some((idx, _)) = rest.char_indices().last() {
            let (num, unit) = rest.split_at(idx);
            if let Ok(n) = num.trim().parse::<i64>() {
                match unit {
                    "d" => return Some(today + Duration::days(n)),
                    "w" => return Some(today + Duration::weeks(n)),
                    // Approximate: 30 days per month
                    "m" => return Some(today + Duration::days(n * 30)),
                    _ => {}
                }
            }
        }
    }

    let (next, name) = match s.strip_prefix("next ") {
        Some(rest) => (true, rest.trim()),
        None => (false, s.strip_prefix("this ").unwrap_or(&s).trim()),
    };
    if let Some(target) = weekday_index(name) {
        let current = today.weekday().num_days_from_monday() as i64;
        let ahead = (target - current).rem_euclid(7);
        let days = if next { ahead + 7 } else { ahead };
        return Some(today + Duration::days(days));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn weekday_index(name: &str) -> Option<i64> {
    const DAYS: [&str; 7] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];
    if name.len() < 3 {
        return None;
    }
    DAYS.iter()
        .position(|d| d.starts_with(name))
        .map(|i| i as i64)
}

/// Monday of the ISO week containing `day`.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d - today).num_days();
            match delta {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {}d", n),
                n => format!("{}d late", -n),
            }
        }
    }
}

/// Parse a duration typed into a time form: "90", "45m", "1h30m", "1.5h".
pub fn parse_minutes(input: &str) -> Option<u32> {
    let s = input.trim().to_lowercase().replace(' ', "");
    if s.is_empty() {
        return None;
    }
    if let Ok(m) = s.parse::<u32>() {
        return Some(m);
    }
    if let Some(h) = s.strip_suffix('h') {
        if let Ok(hours) = h.parse::<f64>() {
            if hours.is_finite() && hours >= 0.0 {
                return Some((hours * 60.0).round() as u32);
            }
        }
    }
    let mut total = 0u32;
    let mut rest = s.as_str();
    if let Some((h, tail)) = rest.split_once('h') {
        total += h.parse::<u32>().ok()? * 60;
        rest = tail;
    }
    if !rest.is_empty() {
        total += rest.strip_suffix('m').unwrap_or(rest).parse::<u32>().ok()?;
    }
    Some(total)
}

/// "1h 30m" style display.
pub fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{}m", m),
        (h, 0) => format!("{}h", h),
        (h, m) => format!("{}h {:02}m", h, m),
    }
}

/// Hours with one decimal, blank for zero (report grids).
pub fn format_hours(minutes: u32) -> String {
    if minutes == 0 {
        String::new()
    } else {
        format!("{:.1}", minutes as f64 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_due_keywords() {
        // 2025-01-08 is a Wednesday
        let today = day("2025-01-08");
        assert_eq!(parse_due_on("today", today), Some(today));
        assert_eq!(parse_due_on("Tomorrow", today), Some(day("2025-01-09")));
        assert_eq!(parse_due_on("in 3d", today), Some(day("2025-01-11")));
        assert_eq!(parse_due_on("in 2w", today), Some(day("2025-01-22")));
        assert_eq!(parse_due_on("eow", today), Some(day("2025-01-12")));
        assert_eq!(parse_due_on("eom", today), Some(day("2025-01-31")));
    }

    #[test]
    fn test_parse_due_weekdays() {
        let today = day("2025-01-08");
        assert_eq!(parse_due_on("fri", today), Some(day("2025-01-10")));
        assert_eq!(parse_due_on("wednesday", today), Some(today));
        assert_eq!(parse_due_on("next fri", today), Some(day("2025-01-17")));
        assert_eq!(parse_due_on("monday", today), Some(day("2025-01-13")));
    }

    #[test]
    fn test_parse_due_iso_and_garbage() {
        let today = day("2025-01-08");
        assert_eq!(parse_due_on("2025-03-01", today), Some(day("2025-03-01")));
        assert_eq!(parse_due_on("soonish", today), None);
        assert_eq!(parse_due_on("mo", today), None);
    }

    #[test]
    fn test_format_due_relative() {
        let today = day("2025-01-08");
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(Some(day("2025-01-11")), today), "in 3d");
        assert_eq!(format_due_relative(Some(day("2025-01-06")), today), "2d late");
    }

    #[test]
    fn test_parse_minutes_forms() {
        assert_eq!(parse_minutes("90"), Some(90));
        assert_eq!(parse_minutes("45m"), Some(45));
        assert_eq!(parse_minutes("1h30m"), Some(90));
        assert_eq!(parse_minutes("2h"), Some(120));
        assert_eq!(parse_minutes("1.5h"), Some(90));
        assert_eq!(parse_minutes("abc"), None);
        assert_eq!(parse_minutes(""), None);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(120), "2h");
        assert_eq!(format_minutes(95), "1h 35m");
    }
}
