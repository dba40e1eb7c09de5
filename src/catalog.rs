use serde::{Deserialize, Serialize};
use std::fmt;

/// A mood level on the 1..=5 scale, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MoodValue(u8);

impl MoodValue {
    pub const MIN: MoodValue = MoodValue(1);
    pub const MAX: MoodValue = MoodValue(5);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn level(self) -> &'static MoodLevel {
        // Every constructed value is in range, so the index is always valid.
        &CATALOG[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for MoodValue {
    type Error = UnknownMood;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(UnknownMood(value))
    }
}

impl From<MoodValue> for u8 {
    fn from(value: MoodValue) -> Self {
        value.0
    }
}

impl fmt::Display for MoodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood value {0}")]
pub struct UnknownMood(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodLevel {
    pub value: MoodValue,
    pub glyph: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

static CATALOG: [MoodLevel; 5] = [
    MoodLevel {
        value: MoodValue(1),
        glyph: "😢",
        label: "Very bad",
        color: "#ef4444",
    },
    MoodLevel {
        value: MoodValue(2),
        glyph: "😞",
        label: "Bad",
        color: "#f97316",
    },
    MoodLevel {
        value: MoodValue(3),
        glyph: "😐",
        label: "Okay",
        color: "#eab308",
    },
    MoodLevel {
        value: MoodValue(4),
        glyph: "🙂",
        label: "Good",
        color: "#22c55e",
    },
    MoodLevel {
        value: MoodValue(5),
        glyph: "🤩",
        label: "Great!",
        color: "#3b82f6",
    },
];

pub fn lookup(value: u8) -> Result<&'static MoodLevel, UnknownMood> {
    MoodValue::try_from(value).map(MoodValue::level)
}

/// All five levels, ascending by value.
pub fn all() -> &'static [MoodLevel] {
    &CATALOG
}
