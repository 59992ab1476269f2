//! Calendar domain model
//!
//! A calendar marks each weekday as working, non-working, or inherited from a
//! base calendar, and lists the working hour ranges within a working day.
//! Only the arithmetic the registry needs lives here: counting working
//! minutes between two instants.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::id::{CalendarKey, ResourceKey};

/// Name of the default base calendar
pub const DEFAULT_BASE_CALENDAR_NAME: &str = "Standard";

/// Name of the calendar used by baselines when present
pub const BASELINE_CALENDAR_NAME: &str = "Used for Microsoft Project 98 Baseline Calendar";

/// Working minutes in one day of duration
pub const MINUTES_PER_DAY: i64 = 480;

/// Day of the week, Sunday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Day {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All days, Sunday first
    pub const ALL: [Day; 7] = [
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Day::Sunday,
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
        }
    }
}

/// Working state of a weekday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Working,
    NonWorking,
    /// Inherit from the base calendar
    #[default]
    Default,
}

/// A working time range within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingRange {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl WorkingRange {
    /// Creates a range from hour/minute pairs
    pub fn hm(from: (u32, u32), to: (u32, u32)) -> Option<Self> {
        Some(Self {
            from: NaiveTime::from_hms_opt(from.0, from.1, 0)?,
            to: NaiveTime::from_hms_opt(to.0, to.1, 0)?,
        })
    }

    /// The default working day: 08:00-12:00 and 13:00-17:00
    pub fn default_hours() -> Vec<Self> {
        [((8, 0), (12, 0)), ((13, 0), (17, 0))]
            .into_iter()
            .filter_map(|(from, to)| Self::hm(from, to))
            .collect()
    }
}

/// Unit of a duration value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Minutes,
    Hours,
    #[default]
    Days,
}

impl TimeUnit {
    fn minutes(self) -> f64 {
        match self {
            TimeUnit::Minutes => 1.0,
            TimeUnit::Hours => 60.0,
            TimeUnit::Days => MINUTES_PER_DAY as f64,
        }
    }

    /// Returns the short suffix for display
    pub fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Minutes => "m",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        }
    }
}

/// An amount of working time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Duration {
    pub value: f64,
    pub units: TimeUnit,
}

impl Duration {
    /// Creates a duration
    pub fn new(value: f64, units: TimeUnit) -> Self {
        Self { value, units }
    }

    /// Expresses a count of working minutes as days
    pub fn from_minutes_as_days(minutes: i64) -> Self {
        Self::new(minutes as f64 / MINUTES_PER_DAY as f64, TimeUnit::Days)
    }

    /// Returns the duration in minutes
    pub fn as_minutes(&self) -> f64 {
        self.value * self.units.minutes()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.units.suffix())
    }
}

/// A working-time calendar
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectCalendar {
    pub(crate) key: CalendarKey,
    pub(crate) unique_id: Option<u32>,
    pub(crate) parent: Option<CalendarKey>,
    pub(crate) resource: Option<ResourceKey>,

    /// Calendar name
    pub name: Option<String>,

    /// Working hour ranges; empty means inherit from the base calendar
    pub hours: Vec<WorkingRange>,

    days: [DayType; 7],
}

impl ProjectCalendar {
    pub(crate) fn new(key: CalendarKey) -> Self {
        Self {
            key,
            unique_id: None,
            parent: None,
            resource: None,
            name: None,
            hours: Vec::new(),
            days: [DayType::Default; 7],
        }
    }

    /// Returns the arena handle
    pub fn key(&self) -> CalendarKey {
        self.key
    }

    /// Returns the durable unique ID
    pub fn unique_id(&self) -> Option<u32> {
        self.unique_id
    }

    /// Returns the base calendar this one derives from
    pub fn parent(&self) -> Option<CalendarKey> {
        self.parent
    }

    /// Returns the resource that owns this calendar
    pub fn resource(&self) -> Option<ResourceKey> {
        self.resource
    }

    /// Returns true if this calendar derives from another
    pub fn is_derived(&self) -> bool {
        self.parent.is_some()
    }

    /// Sets the calendar name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Returns the day type for a weekday
    pub fn day_type(&self, day: Day) -> DayType {
        self.days[day.index()]
    }

    /// Sets the day type for a weekday
    pub fn set_day_type(&mut self, day: Day, day_type: DayType) {
        self.days[day.index()] = day_type;
    }

    /// Marks a weekday as working or non-working
    pub fn set_working_day(&mut self, day: Day, working: bool) {
        let day_type = if working {
            DayType::Working
        } else {
            DayType::NonWorking
        };
        self.set_day_type(day, day_type);
    }

    /// Returns all seven day types, Sunday first
    pub fn day_types(&self) -> &[DayType; 7] {
        &self.days
    }

    /// Installs the default working hours
    pub fn add_default_calendar_hours(&mut self) {
        self.hours = WorkingRange::default_hours();
    }
}

/// Counts working minutes in `[start, end)`
///
/// `is_working` decides whether a weekday is worked; `hours` are the ranges
/// worked on such a day.
pub fn working_minutes_between(
    start: NaiveDateTime,
    end: NaiveDateTime,
    is_working: impl Fn(Day) -> bool,
    hours: &[WorkingRange],
) -> i64 {
    if end <= start {
        return 0;
    }

    let mut total = 0;
    let mut date = start.date();
    while date <= end.date() {
        if is_working(Day::from(date.weekday())) {
            for range in hours {
                let lo = date.and_time(range.from).max(start);
                let hi = date.and_time(range.to).min(end);
                if hi > lo {
                    total += (hi - lo).num_minutes();
                }
            }
        }

        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    total
}
