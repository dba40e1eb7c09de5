use crate::models::{RecordMap, User};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

pub const CELEBRATION_MS: u64 = 8_000;

/// Full-screen confetti shown while a perfect streak holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Celebration {
    pub duration_ms: u64,
}

pub fn celebration_for(streak: bool) -> Option<Celebration> {
    streak.then_some(Celebration {
        duration_ms: CELEBRATION_MS,
    })
}

pub fn report_filename(today: NaiveDate) -> String {
    format!("MoodFlow-report-{today}.txt")
}

/// Plain-text summary plus every entry, newest first.
pub fn plain_text_report(records: &RecordMap, user: &User, today: NaiveDate) -> String {
    let total = records.len();
    let average = if total == 0 {
        "0".to_string()
    } else {
        let sum: u32 = records.values().map(|record| u32::from(record.mood.get())).sum();
        format!("{:.1}", f64::from(sum) / total as f64)
    };
    let earliest = records
        .keys()
        .next()
        .map_or_else(|| "none".to_string(), NaiveDate::to_string);
    let latest = records
        .keys()
        .next_back()
        .map_or_else(|| "none".to_string(), NaiveDate::to_string);

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "MoodFlow report for {}", user.email);
    let _ = writeln!(out, "Generated: {today}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Total records: {total}");
    let _ = writeln!(out, "Average mood: {average}");
    let _ = writeln!(out, "Earliest entry: {earliest}");
    let _ = writeln!(out, "Latest entry: {latest}");
    let _ = writeln!(out);
    let _ = writeln!(out, "Entries (newest first):");
    for record in records.values().rev() {
        let level = record.mood.level();
        let note = match record.note.trim() {
            "" => "none",
            note => note,
        };
        let _ = writeln!(
            out,
            "{}  {}  {}  {}",
            record.date, level.glyph, level.label, note
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MoodValue;
    use crate::models::MoodRecord;
    use chrono::Utc;

    fn user() -> User {
        User {
            uid: "u1".into(),
            email: "anna@example.com".into(),
        }
    }

    fn record(date: &str, mood: u8, note: &str) -> (NaiveDate, MoodRecord) {
        let date: NaiveDate = date.parse().unwrap();
        (
            date,
            MoodRecord {
                date,
                mood: MoodValue::new(mood).unwrap(),
                note: note.into(),
                created_at: Utc::now(),
            },
        )
    }

    #[test]
    fn empty_report_has_zero_totals() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let report = plain_text_report(&RecordMap::new(), &user(), today);
        assert!(report.contains("Total records: 0"));
        assert!(report.contains("Average mood: 0\n"));
        assert!(report.contains("Earliest entry: none"));
        assert!(report.contains("Latest entry: none"));
    }

    #[test]
    fn report_lists_entries_newest_first() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let records: RecordMap = [
            record("2024-01-01", 2, "rainy"),
            record("2024-01-03", 5, ""),
            record("2024-01-02", 4, "walk"),
        ]
        .into_iter()
        .collect();

        let report = plain_text_report(&records, &user(), today);
        assert!(report.starts_with("MoodFlow report for anna@example.com\n"));
        assert!(report.contains("Total records: 3"));
        assert!(report.contains("Average mood: 3.7"));
        assert!(report.contains("Earliest entry: 2024-01-01"));
        assert!(report.contains("Latest entry: 2024-01-03"));

        let lines: Vec<&str> = report.lines().skip_while(|line| !line.starts_with("Entries")).skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "2024-01-03  🤩  Great!  none",
                "2024-01-02  🙂  Good  walk",
                "2024-01-01  😞  Bad  rainy",
            ]
        );
    }

    #[test]
    fn report_is_deterministic() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let records: RecordMap = [record("2024-01-01", 3, "")].into_iter().collect();
        assert_eq!(
            plain_text_report(&records, &user(), today),
            plain_text_report(&records, &user(), today)
        );
    }

    #[test]
    fn filename_carries_date() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(report_filename(today), "MoodFlow-report-2024-02-01.txt");
    }
}
