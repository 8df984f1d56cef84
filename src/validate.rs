//! Year and year-range validation gating the analyses.

use serde::Deserialize;

pub const FIRST_YEAR: i64 = 1998;
pub const LAST_YEAR: i64 = 2020;

/// Values that may be coerced to a year.
pub trait YearInput {
    fn to_year(&self) -> Option<i64>;
}

impl YearInput for i64 {
    fn to_year(&self) -> Option<i64> {
        Some(*self)
    }
}

impl YearInput for i32 {
    fn to_year(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

impl YearInput for u32 {
    fn to_year(&self) -> Option<i64> {
        Some(i64::from(*self))
    }
}

impl YearInput for str {
    fn to_year(&self) -> Option<i64> {
        self.trim().parse().ok()
    }
}

impl YearInput for &str {
    fn to_year(&self) -> Option<i64> {
        (**self).to_year()
    }
}

impl YearInput for String {
    fn to_year(&self) -> Option<i64> {
        self.as_str().to_year()
    }
}

/// Inclusive range of years the catalog is analysed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct YearValidator {
    pub first: i64,
    pub last: i64,
}

impl Default for YearValidator {
    fn default() -> Self {
        Self {
            first: FIRST_YEAR,
            last: LAST_YEAR,
        }
    }
}

impl YearValidator {
    pub fn new(first: i64, last: i64) -> Self {
        Self { first, last }
    }

    /// Coerce `year` and check it lies within the range.
    pub fn valid_year<Y: YearInput + ?Sized>(&self, year: &Y) -> Option<i64> {
        year.to_year()
            .filter(|y| (self.first..=self.last).contains(y))
    }

    pub fn is_valid_year<Y: YearInput + ?Sized>(&self, year: &Y) -> bool {
        self.valid_year(year).is_some()
    }

    /// Both ends inside the range and `start <= end`.
    pub fn is_valid_range(&self, start: i64, end: i64) -> bool {
        let range = self.first..=self.last;
        range.contains(&start) && range.contains(&end) && start <= end
    }
}

/// Range check against the default 1998-2020 bounds.
pub fn year_check(start: i64, end: i64) -> bool {
    YearValidator::default().is_valid_range(start, end)
}
