//! The report timestamp contract.
//!
//! A well-formed report carries a `DD.MM.YYYY HH:MM` stamp at the end of its
//! second line. Classification, archive naming, and the report header all go
//! through this module so the pattern lives in exactly one place.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

/// Length in characters of a rendered stamp (`DD.MM.YYYY HH:MM`).
/// The stamp is ASCII, so this is also its length in bytes.
pub const STAMP_LEN: usize = 16;

const HUMAN_FORMAT: &str = "%d.%m.%Y %H:%M";

fn stamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{2}\.\d{2}\.\d{4} \d{2}:\d{2}$").expect("stamp pattern compiles")
    })
}

/// Render a date-time as a human-readable stamp.
pub fn human(at: NaiveDateTime) -> String {
    at.format(HUMAN_FORMAT).to_string()
}

/// Whether `candidate` matches the stamp pattern exactly.
pub fn is_valid(candidate: &str) -> bool {
    stamp_pattern().is_match(candidate)
}

/// Parse a human stamp back into a date-time. Minute precision only.
pub fn parse(candidate: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(candidate, HUMAN_FORMAT).ok()
}

/// Reformat a valid human stamp into a filesystem-safe ordering,
/// `YYYY-MM-DDTHH：MM`. The full-width colon (U+FF1A) stands in for the
/// ASCII colon, which some filesystems forbid in names.
pub fn fs_safe(human_stamp: &str) -> Option<String> {
    if !is_valid(human_stamp) {
        return None;
    }
    let day = &human_stamp[0..2];
    let month = &human_stamp[3..5];
    let year = &human_stamp[6..10];
    let hour = &human_stamp[11..13];
    let minute = &human_stamp[14..16];
    Some(format!("{year}-{month}-{day}T{hour}\u{ff1a}{minute}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn human_stamp_has_fixed_width() {
        let at = NaiveDate::from_ymd_opt(2023, 1, 5)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let rendered = human(at);
        assert_eq!(rendered, "05.01.2023 10:00");
        assert_eq!(rendered.len(), STAMP_LEN);
        assert!(is_valid(&rendered));
    }

    #[test]
    fn rejects_near_misses() {
        assert!(!is_valid("5.01.2023 10:00"));
        assert!(!is_valid("05.01.2023 10:00:30"));
        assert!(!is_valid("05-01-2023 10:00"));
        assert!(!is_valid(""));
        assert!(!is_valid("Leanne Graham<Sincere@april.biz>"));
    }

    #[test]
    fn fs_safe_reorders_and_swaps_colon() {
        assert_eq!(
            fs_safe("05.01.2023 10:00").as_deref(),
            Some("2023-01-05T10\u{ff1a}00")
        );
        assert!(fs_safe("not a stamp").is_none());
    }

    #[test]
    fn fs_safe_round_trips_to_the_same_minute() {
        for raw in ["05.01.2023 10:00", "31.12.1999 23:59", "29.02.2024 00:01"] {
            let original = parse(raw).expect("valid stamp parses");
            let safe = fs_safe(raw).expect("valid stamp reformats");
            let (date_part, time_part) = safe.split_once('T').expect("T separator");
            let restored = format!(
                "{}.{}.{} {}",
                &date_part[8..10],
                &date_part[5..7],
                &date_part[0..4],
                time_part.replace('\u{ff1a}', ":"),
            );
            assert_eq!(parse(&restored), Some(original));
        }
    }

    #[test]
    fn render_then_parse_is_identity_at_minute_precision() {
        let at = NaiveDate::from_ymd_opt(2024, 7, 15)
            .unwrap()
            .and_hms_opt(8, 45, 0)
            .unwrap();
        assert_eq!(parse(&human(at)), Some(at));
    }
}
