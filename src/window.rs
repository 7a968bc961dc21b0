//! Rolling window of calendar days over open timeslots.
//!
//! Days are anchored at midnight in a fixed UTC offset. A timeslot belongs to the
//! day its start instant falls on in that offset, so two instants share a day iff
//! they share year, month and day-of-month there, never by 24h arithmetic.

use std::collections::HashMap;

use chrono::{Datelike, Days, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::limits::{MAX_SLOT_PADDING, MAX_WINDOW_DAYS};
use crate::model::*;

pub const DEFAULT_WINDOW_DAYS: u32 = 4;

/// Cells every day bucket shows, open or not.
pub const DEFAULT_SLOT_PADDING: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

/// One position in a day column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotCell {
    Open {
        timeslot: Timeslot,
        /// Start time, `"HH:MM"`.
        label: String,
        selected: bool,
    },
    Empty,
}

impl SlotCell {
    pub fn timeslot(&self) -> Option<&Timeslot> {
        match self {
            SlotCell::Open { timeslot, .. } => Some(timeslot),
            SlotCell::Empty => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    /// `"Mon"`
    pub weekday: String,
    pub day: u32,
    /// `"Jan"`
    pub month: String,
    pub slots: Vec<SlotCell>,
}

impl DayBucket {
    pub fn open_slots(&self) -> impl Iterator<Item = &Timeslot> {
        self.slots.iter().filter_map(SlotCell::timeslot)
    }

    pub fn has_open_slots(&self) -> bool {
        self.open_slots().next().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOptions {
    pub days: u32,
    pub padding: usize,
    pub offset: FixedOffset,
    /// Timeslot currently picked in the form, flagged on its cell.
    pub selected: Option<TimeslotId>,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
            padding: DEFAULT_SLOT_PADDING,
            offset: Utc.fix(),
            selected: None,
        }
    }
}

pub fn local_date(ts: Timestamp, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

pub fn slot_label(ts: Timestamp, offset: FixedOffset) -> String {
    ts.with_timezone(&offset).format("%H:%M").to_string()
}

/// `"Mon 3 Jan 2022, 09:00 - 09:30"`. The end date is repeated only when it
/// falls on another day.
pub fn format_range(from: Timestamp, to: Timestamp, offset: FixedOffset) -> String {
    let from = from.with_timezone(&offset);
    let to = to.with_timezone(&offset);
    let head = from.format("%a %-d %b %Y, %H:%M");
    if from.date_naive() == to.date_naive() {
        format!("{head} - {}", to.format("%H:%M"))
    } else {
        format!("{head} - {}", to.format("%a %-d %b %Y, %H:%M"))
    }
}

/// Bucket `resolved` into `options.days` consecutive days starting at `cursor`.
///
/// Each bucket is padded with [`SlotCell::Empty`] up to `options.padding`; a
/// busier day keeps all its slots. Slots within a day keep the order of `resolved`.
/// `days` and `padding` are capped at [`MAX_WINDOW_DAYS`] and [`MAX_SLOT_PADDING`].
pub fn window(resolved: &[Timeslot], cursor: NaiveDate, options: &WindowOptions) -> Vec<DayBucket> {
    let mut by_day: HashMap<NaiveDate, Vec<&Timeslot>> = HashMap::new();
    for t in resolved {
        by_day
            .entry(local_date(t.start_date, options.offset))
            .or_default()
            .push(t);
    }

    let days = options.days.min(MAX_WINDOW_DAYS);
    let padding = options.padding.min(MAX_SLOT_PADDING);
    let mut buckets = Vec::with_capacity(days as usize);
    for i in 0..days {
        let Some(date) = cursor.checked_add_days(Days::new(u64::from(i))) else {
            break;
        };
        let mut slots: Vec<SlotCell> = by_day
            .get(&date)
            .map(|day| {
                day.iter()
                    .map(|t| SlotCell::Open {
                        timeslot: (*t).clone(),
                        label: slot_label(t.start_date, options.offset),
                        selected: options.selected == Some(t.id),
                    })
                    .collect()
            })
            .unwrap_or_default();
        while slots.len() < padding {
            slots.push(SlotCell::Empty);
        }
        buckets.push(DayBucket {
            date,
            weekday: date.format("%a").to_string(),
            day: date.day(),
            month: date.format("%b").to_string(),
            slots,
        });
    }
    buckets
}

/// Move the cursor a whole window. Going back never lands before `min_bound`:
/// such a move leaves the cursor where it is.
pub fn advance(cursor: NaiveDate, direction: Direction, window_size: u32, min_bound: NaiveDate) -> NaiveDate {
    let step = Days::new(u64::from(window_size));
    match direction {
        Direction::Forward => cursor.checked_add_days(step).unwrap_or(cursor),
        Direction::Backward => match cursor.checked_sub_days(step) {
            Some(prev) if prev >= min_bound => prev,
            _ => cursor,
        },
    }
}

/// Cursor state for paging through the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    cursor: NaiveDate,
    min_bound: NaiveDate,
    days: u32,
    padding: usize,
    offset: FixedOffset,
}

impl DateWindow {
    /// Window positioned on its own lower bound.
    pub fn new(min_bound: NaiveDate, config: &EngineConfig) -> Self {
        Self::at(min_bound, min_bound, config)
    }

    pub fn at(cursor: NaiveDate, min_bound: NaiveDate, config: &EngineConfig) -> Self {
        Self {
            cursor: cursor.max(min_bound),
            min_bound,
            days: config.window_days,
            padding: config.slot_padding,
            offset: config.offset(),
        }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn min_bound(&self) -> NaiveDate {
        self.min_bound
    }

    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Last date shown, inclusive.
    pub fn last_day(&self) -> NaiveDate {
        self.cursor
            .checked_add_days(Days::new(u64::from(self.days.saturating_sub(1))))
            .unwrap_or(self.cursor)
    }

    pub fn advance(&mut self, direction: Direction) -> NaiveDate {
        self.cursor = advance(self.cursor, direction, self.days, self.min_bound);
        self.cursor
    }

    pub fn next_page(&mut self) -> NaiveDate {
        self.advance(Direction::Forward)
    }

    pub fn previous_page(&mut self) -> NaiveDate {
        self.advance(Direction::Backward)
    }

    pub fn can_go_back(&self) -> bool {
        advance(self.cursor, Direction::Backward, self.days, self.min_bound) != self.cursor
    }

    pub fn options(&self, selected: Option<TimeslotId>) -> WindowOptions {
        WindowOptions {
            days: self.days,
            padding: self.padding,
            offset: self.offset,
            selected,
        }
    }

    pub fn buckets(&self, resolved: &[Timeslot], selected: Option<TimeslotId>) -> Vec<DayBucket> {
        window(resolved, self.cursor, &self.options(selected))
    }
}
