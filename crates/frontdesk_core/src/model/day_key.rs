//! Local calendar day key (`YYYY-MM-DD`).
//!
//! # Invariants
//! - Text form is always zero-padded `YYYY-MM-DD`, so ordering the typed
//!   value and ordering its text lexicographically agree.
//! - A record's key is captured once from the local wall clock at creation.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

static DAY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid day key regex"));

/// Calendar day used as the primary filter and grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Day key for the current local wall-clock date.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

/// Rejected day key text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayKeyParseError(pub String);

impl Display for DayKeyParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid day key `{}`; expected YYYY-MM-DD", self.0)
    }
}

impl Error for DayKeyParseError {}

impl FromStr for DayKey {
    type Err = DayKeyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !DAY_KEY_RE.is_match(trimmed) {
            return Err(DayKeyParseError(value.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| DayKeyParseError(value.to_string()))
    }
}

impl TryFrom<String> for DayKey {
    type Error = DayKeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayKey> for String {
    fn from(value: DayKey) -> Self {
        value.to_string()
    }
}
