// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lock-period to APY table.
//!
//! The table is the single source of truth for rates offered at deposit time.
//! Rates are held in basis points so `8.5%` is exact; lock periods are held in
//! half-month units so the 15-day option is exact.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::YieldModelError;

/// Basis points in one whole percent.
pub const BASIS_POINTS_PER_PERCENT: u32 = 100;

/// Days counted per half month when deriving a local lock deadline.
const DAYS_PER_HALF_MONTH: i64 = 15;

/// `(half_months, apy_basis_points)`, ascending by duration.
const LOCK_PERIOD_TABLE: [(u8, u32); 13] = [
    (1, 700),
    (2, 800),
    (4, 850),
    (6, 900),
    (8, 950),
    (10, 1000),
    (12, 1050),
    (14, 1100),
    (16, 1150),
    (18, 1200),
    (20, 1250),
    (22, 1300),
    (24, 1400),
];

/// Annual percentage yield, stored in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Apy(u32);

impl Apy {
    pub const fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    /// Parse a percentage such as `10.5`. Rejects negative and non-finite values.
    pub fn from_percent(percent: f64) -> Result<Self, YieldModelError> {
        if !percent.is_finite() || percent < 0.0 {
            return Err(YieldModelError::InvalidApy(percent));
        }
        let bps = (percent * f64::from(BASIS_POINTS_PER_PERCENT)).round();
        if bps > f64::from(u32::MAX) {
            return Err(YieldModelError::InvalidApy(percent));
        }
        Ok(Self(bps as u32))
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    pub fn as_percent(self) -> f64 {
        f64::from(self.0) / f64::from(BASIS_POINTS_PER_PERCENT)
    }
}

impl fmt::Display for Apy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent())
    }
}

/// A lock duration that exists in the rate table.
///
/// Only constructed through [`LockPeriod::from_months`] or
/// [`LockPeriod::all`], so holding one means the APY lookup cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct LockPeriod {
    half_months: u8,
    apy: Apy,
}

impl LockPeriod {
    /// Validate a requested duration in months (`0.5`, `1`, `2`, ... `12`).
    pub fn from_months(months: f64) -> Result<Self, YieldModelError> {
        let half_months = months * 2.0;
        LOCK_PERIOD_TABLE
            .iter()
            .find(|(half, _)| f64::from(*half) == half_months)
            .map(|&(half_months, bps)| Self {
                half_months,
                apy: Apy::from_basis_points(bps),
            })
            .ok_or(YieldModelError::InvalidLockPeriod(months))
    }

    /// Every supported period, shortest first.
    pub fn all() -> impl Iterator<Item = LockPeriod> {
        LOCK_PERIOD_TABLE.iter().map(|&(half_months, bps)| Self {
            half_months,
            apy: Apy::from_basis_points(bps),
        })
    }

    pub fn months(self) -> f64 {
        f64::from(self.half_months) / 2.0
    }

    /// Rate offered for new deposits under this lock.
    pub fn apy(self) -> Apy {
        self.apy
    }

    /// Lock length used when the deadline has to be derived locally.
    /// Half a month counts as 15 days, a month as 30.
    pub fn duration(self) -> Duration {
        Duration::days(DAYS_PER_HALF_MONTH * i64::from(self.half_months))
    }
}

impl TryFrom<f64> for LockPeriod {
    type Error = YieldModelError;

    fn try_from(months: f64) -> Result<Self, Self::Error> {
        Self::from_months(months)
    }
}

impl From<LockPeriod> for f64 {
    fn from(period: LockPeriod) -> Self {
        period.months()
    }
}

/// Look up the APY for a lock duration in months.
///
/// Unknown durations are an error; they are never billed at a default rate.
pub fn apy_for_lock_period(months: f64) -> Result<Apy, YieldModelError> {
    LockPeriod::from_months(months).map(LockPeriod::apy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_row_returns_documented_rate() {
        let expected = [
            (0.5, 7.0),
            (1.0, 8.0),
            (2.0, 8.5),
            (3.0, 9.0),
            (4.0, 9.5),
            (5.0, 10.0),
            (6.0, 10.5),
            (7.0, 11.0),
            (8.0, 11.5),
            (9.0, 12.0),
            (10.0, 12.5),
            (11.0, 13.0),
            (12.0, 14.0),
        ];
        for (months, percent) in expected {
            let apy = apy_for_lock_period(months).unwrap();
            assert_eq!(apy.as_percent(), percent, "months = {months}");
        }
    }

    #[test]
    fn six_months_is_ten_and_a_half_percent() {
        assert_eq!(apy_for_lock_period(6.0).unwrap().basis_points(), 1050);
    }

    #[test]
    fn unknown_periods_are_rejected() {
        for months in [13.0, 0.0, -1.0, 1.5, 0.25, 24.0, f64::NAN, f64::INFINITY] {
            let err = apy_for_lock_period(months).unwrap_err();
            assert!(
                matches!(err, YieldModelError::InvalidLockPeriod(_)),
                "months = {months}"
            );
        }
    }

    #[test]
    fn table_is_ordered_and_apy_increases() {
        let periods: Vec<LockPeriod> = LockPeriod::all().collect();
        assert_eq!(periods.len(), 13);
        for pair in periods.windows(2) {
            assert!(pair[0].months() < pair[1].months());
            assert!(pair[0].apy() < pair[1].apy());
        }
    }

    #[test]
    fn half_month_lock_lasts_fifteen_days() {
        assert_eq!(LockPeriod::from_months(0.5).unwrap().duration(), Duration::days(15));
        assert_eq!(LockPeriod::from_months(12.0).unwrap().duration(), Duration::days(360));
    }

    #[test]
    fn serializes_as_months() {
        let period = LockPeriod::from_months(0.5).unwrap();
        assert_eq!(serde_json::to_string(&period).unwrap(), "0.5");

        let parsed: LockPeriod = serde_json::from_str("3").unwrap();
        assert_eq!(parsed.apy().basis_points(), 900);

        assert!(serde_json::from_str::<LockPeriod>("13").is_err());
    }

    #[test]
    fn apy_from_percent_rounds_to_basis_points() {
        assert_eq!(Apy::from_percent(10.5).unwrap().basis_points(), 1050);
        assert_eq!(Apy::from_percent(0.0).unwrap().basis_points(), 0);
        assert!(Apy::from_percent(-1.0).is_err());
        assert!(Apy::from_percent(f64::NAN).is_err());
    }
}
