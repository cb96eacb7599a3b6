//! Weekly shift pattern gating when service may start.
//!
//! Time is measured in hours from Monday 00:00. Monday through Saturday run two
//! 4-hour shifts, 08:00-12:00 and 14:00-18:00, each interrupted by a 10-minute
//! break at its midpoint. Sunday is off.

use super::types::SimTime;
use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: f64 = 24.0;
pub const DAYS_PER_WEEK: u64 = 7;
/// Day index (0 = Monday) with no shifts
pub const REST_DAY: u64 = 6;

const SHIFTS: [(f64, f64); 2] = [(8.0, 12.0), (14.0, 18.0)];
const BREAK_LENGTH: f64 = 10.0 / 60.0;
const BREAKS: [(f64, f64); 2] = [(10.0, 10.0 + BREAK_LENGTH), (16.0, 16.0 + BREAK_LENGTH)];
/// Hours of the day at which work resumes: shift starts and break ends
const WORK_STARTS: [f64; 4] = [SHIFTS[0].0, BREAKS[0].1, SHIFTS[1].0, BREAKS[1].1];

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// What the line is doing at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    Working,
    OnBreak,
    OffShift,
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WorkStatus::Working => "WORKING",
            WorkStatus::OnBreak => "ON BREAK",
            WorkStatus::OffShift => "OFF SHIFT",
        };
        write!(f, "{}", label)
    }
}

fn day_of_week(t: SimTime) -> u64 {
    (t / HOURS_PER_DAY).floor().max(0.0) as u64 % DAYS_PER_WEEK
}

fn hour_of_day(t: SimTime) -> f64 {
    t.rem_euclid(HOURS_PER_DAY)
}

fn within(h: f64, windows: &[(f64, f64)]) -> bool {
    windows.iter().any(|&(start, end)| h >= start && h < end)
}

/// Classify the instant `t`
pub fn work_status(t: SimTime) -> WorkStatus {
    if day_of_week(t) == REST_DAY {
        return WorkStatus::OffShift;
    }
    let h = hour_of_day(t);
    if !within(h, &SHIFTS) {
        WorkStatus::OffShift
    } else if within(h, &BREAKS) {
        WorkStatus::OnBreak
    } else {
        WorkStatus::Working
    }
}

/// Whether the line is staffed at `t`
pub fn is_working(t: SimTime) -> bool {
    work_status(t) == WorkStatus::Working
}

/// Daylight hours, 06:00-20:00
pub fn is_day_time(t: SimTime) -> bool {
    let h = hour_of_day(t);
    (6.0..20.0).contains(&h)
}

/// Human-readable clock, e.g. `Tuesday 8:05 AM - Day`
pub fn format_date_time(t: SimTime) -> String {
    let day = DAY_NAMES[day_of_week(t) as usize];
    let h = hour_of_day(t);
    let hours = h.floor() as u32;
    let minutes = ((h - h.floor()) * 60.0).floor() as u32;
    let ampm = if hours >= 12 { "PM" } else { "AM" };
    let display_hours = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };
    let period = if is_day_time(t) { "Day" } else { "Night" };
    format!("{} {}:{:02} {} - {}", day, display_hours, minutes, ampm, period)
}

/// Earliest instant strictly after `t` at which work resumes.
///
/// Boundaries are computed from the day start and then nudged forward to the
/// first representable time that `is_working` accepts, so that starting
/// service "at the boundary" is always allowed by the gate.
pub fn next_work_start(t: SimTime) -> SimTime {
    let first_day = (t.max(0.0) / HOURS_PER_DAY).floor();
    for offset in 0..=DAYS_PER_WEEK {
        let day_start = (first_day + offset as f64) * HOURS_PER_DAY;
        if day_of_week(day_start) == REST_DAY {
            continue;
        }
        for &hour in WORK_STARTS.iter() {
            let boundary = first_representable_working(day_start + hour);
            if boundary > t {
                return boundary;
            }
        }
    }
    // Every week has working days, so the loop always returns
    f64::INFINITY
}

fn first_representable_working(candidate: SimTime) -> SimTime {
    let mut s = candidate;
    for _ in 0..16 {
        if is_working(s) {
            return s;
        }
        s = f64::from_bits(s.to_bits() + 1);
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONDAY: f64 = 0.0;
    const SUNDAY: f64 = 6.0 * HOURS_PER_DAY;

    #[test]
    fn test_shift_edges() {
        assert!(!is_working(MONDAY + 7.99));
        assert!(is_working(MONDAY + 8.0));
        assert!(is_working(MONDAY + 11.99));
        assert!(!is_working(MONDAY + 12.0));
        assert!(!is_working(MONDAY + 13.5));
        assert!(is_working(MONDAY + 14.0));
        assert!(!is_working(MONDAY + 18.0));
    }

    #[test]
    fn test_breaks() {
        assert!(is_working(9.99));
        assert_eq!(work_status(10.0), WorkStatus::OnBreak);
        assert_eq!(work_status(10.1), WorkStatus::OnBreak);
        assert!(is_working(10.17));
        assert_eq!(work_status(16.05), WorkStatus::OnBreak);
        assert!(is_working(16.2));
    }

    #[test]
    fn test_rest_day() {
        assert_eq!(work_status(SUNDAY + 9.0), WorkStatus::OffShift);
        assert!(is_working(SUNDAY - 24.0 + 9.0));
        // The following Monday works again
        assert!(is_working(SUNDAY + 24.0 + 9.0));
    }

    #[test]
    fn test_next_work_start() {
        assert_eq!(next_work_start(0.0), 8.0);
        assert_eq!(next_work_start(7.9), 8.0);
        let after_break = next_work_start(10.05);
        assert!(is_working(after_break));
        assert!((after_break - (10.0 + 10.0 / 60.0)).abs() < 1e-9);
        assert_eq!(next_work_start(12.5), 14.0);
        // Saturday evening skips Sunday
        let saturday_night = 5.0 * HOURS_PER_DAY + 19.0;
        assert_eq!(next_work_start(saturday_night), 7.0 * HOURS_PER_DAY + 8.0);
    }

    #[test]
    fn test_next_work_start_is_strictly_later() {
        assert!(next_work_start(8.0) > 8.0);
        let mut t = 0.0;
        for _ in 0..50 {
            let next = next_work_start(t);
            assert!(next > t);
            assert!(is_working(next));
            t = next;
        }
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time(0.0), "Monday 12:00 AM - Night");
        assert_eq!(format_date_time(24.0 + 8.25), "Tuesday 8:15 AM - Day");
        assert_eq!(format_date_time(14.5), "Monday 2:30 PM - Day");
        assert_eq!(format_date_time(SUNDAY + 21.0), "Sunday 9:00 PM - Night");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(WorkStatus::Working.to_string(), "WORKING");
        assert_eq!(work_status(3.0).to_string(), "OFF SHIFT");
    }
}
