use crate::catalog::{self, MoodValue};
use crate::export::{Celebration, celebration_for};
use crate::models::{MoodRecord, RecordMap};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;

pub const CALENDAR_DAYS_BACK: i64 = 30;
pub const CALENDAR_DAYS_AHEAD: i64 = 4;
pub const CALENDAR_CELLS: usize = (CALENDAR_DAYS_BACK + 1 + CALENDAR_DAYS_AHEAD) as usize;
pub const TREND_LENGTH: usize = 30;
pub const STREAK_LENGTH: usize = 7;

const EMPTY_CELL_COLOR: &str = "#f3f4f6";

#[derive(Debug, Clone, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub day: u32,
    pub record: Option<MoodRecord>,
    pub color: &'static str,
    pub is_today: bool,
    /// Future cells are locked whether or not a record exists.
    pub is_future: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionSlice {
    pub mood: MoodValue,
    pub glyph: &'static str,
    pub label: &'static str,
    pub color: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub mood: MoodValue,
}

/// Everything the page draws, recomputed on each record map change.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedViews {
    pub today: NaiveDate,
    pub today_record: Option<MoodRecord>,
    pub calendar: Vec<CalendarCell>,
    pub distribution: Vec<DistributionSlice>,
    pub trend: Vec<TrendPoint>,
    pub streak: bool,
    pub celebration: Option<Celebration>,
    pub total: usize,
}

/// The current calendar day in the server's local timezone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn build_views(records: &RecordMap) -> DerivedViews {
    build_views_at(local_today(), records)
}

pub fn build_views_at(today: NaiveDate, records: &RecordMap) -> DerivedViews {
    let streak = streak_flag(records);
    DerivedViews {
        today,
        today_record: records.get(&today).cloned(),
        calendar: calendar_window(records, today),
        distribution: distribution_slices(records),
        trend: trend(records),
        streak,
        celebration: celebration_for(streak),
        total: records.len(),
    }
}

/// 35 consecutive days from `today - 30` through `today + 4`.
pub fn calendar_window(records: &RecordMap, today: NaiveDate) -> Vec<CalendarCell> {
    let start = today - Duration::days(CALENDAR_DAYS_BACK);
    (0..CALENDAR_CELLS as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let record = records.get(&date).cloned();
            let color = record
                .as_ref()
                .map(|record| record.mood.level().color)
                .unwrap_or(EMPTY_CELL_COLOR);
            CalendarCell {
                date,
                day: date.day(),
                record,
                color,
                is_today: date == today,
                is_future: date > today,
            }
        })
        .collect()
}

/// Count of records per mood value, ascending by value.
pub fn distribution<'a>(records: impl IntoIterator<Item = &'a MoodRecord>) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for record in records {
        counts[usize::from(record.mood.get() - 1)] += 1;
    }
    counts
}

/// All-time distribution for the pie chart.
pub fn distribution_slices(records: &RecordMap) -> Vec<DistributionSlice> {
    let counts = distribution(records.values());
    catalog::all()
        .iter()
        .zip(counts)
        .map(|(level, count)| DistributionSlice {
            mood: level.value,
            glyph: level.glyph,
            label: level.label,
            color: level.color,
            count,
        })
        .collect()
}

/// The most recent 30 dated entries present, oldest first. Gaps between
/// dates are not filled.
pub fn trend(records: &RecordMap) -> Vec<TrendPoint> {
    let skip = records.len().saturating_sub(TREND_LENGTH);
    records
        .values()
        .skip(skip)
        .map(|record| TrendPoint {
            date: record.date,
            mood: record.mood,
        })
        .collect()
}

/// True when the seven most recent recorded dates are all at the top mood.
/// The dates need not be consecutive calendar days, and a record dated
/// after today still counts as the most recent.
pub fn streak_flag(records: &RecordMap) -> bool {
    let recent: Vec<&MoodRecord> = records.values().rev().take(STREAK_LENGTH).collect();
    recent.len() == STREAK_LENGTH && recent.iter().all(|record| record.mood == MoodValue::MAX)
}
