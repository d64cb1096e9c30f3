//! Calendar with per-day events

use crate::store::{read_json, write_json, PreferenceStore, KEY_CALENDAR_EVENTS};
use anyhow::Result;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::BTreeMap;

/// Month view cursor plus the events of every day
#[derive(Debug, Clone)]
pub struct Calendar {
    pub selected: NaiveDate,
    events: BTreeMap<NaiveDate, Vec<String>>,
}

impl Calendar {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            selected: today,
            events: BTreeMap::new(),
        }
    }

    pub fn load(store: &dyn PreferenceStore, today: NaiveDate) -> Self {
        let mut calendar = Self::new(today);
        if let Some(events) = read_json(store, KEY_CALENDAR_EVENTS) {
            calendar.events = events;
        }
        calendar
    }

    pub fn save(&self, store: &mut dyn PreferenceStore) -> Result<()> {
        write_json(store, KEY_CALENDAR_EVENTS, &self.events)
    }

    pub fn move_days(&mut self, delta: i64) {
        let days = Days::new(delta.unsigned_abs());
        let moved = if delta >= 0 {
            self.selected.checked_add_days(days)
        } else {
            self.selected.checked_sub_days(days)
        };
        if let Some(date) = moved {
            self.selected = date;
        }
    }

    /// Move by whole months; the day is clamped to the target month's length
    pub fn move_months(&mut self, delta: i32) {
        let months = Months::new(delta.unsigned_abs());
        let moved = if delta >= 0 {
            self.selected.checked_add_months(months)
        } else {
            self.selected.checked_sub_months(months)
        };
        if let Some(date) = moved {
            self.selected = date;
        }
    }

    /// Add an event to the selected day. Blank titles are ignored.
    pub fn add_event(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.events
            .entry(self.selected)
            .or_default()
            .push(title.to_string());
        true
    }

    /// Remove the most recent event of the selected day
    pub fn remove_last_event(&mut self) -> Option<String> {
        let list = self.events.get_mut(&self.selected)?;
        let removed = list.pop();
        if list.is_empty() {
            self.events.remove(&self.selected);
        }
        removed
    }

    pub fn events_on(&self, date: NaiveDate) -> &[String] {
        self.events.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_events(&self, date: NaiveDate) -> bool {
        self.events.contains_key(&date)
    }

    /// Title like "March 2025"
    pub fn month_title(&self) -> String {
        self.selected.format("%B %Y").to_string()
    }

    /// Weeks of the selected month, Monday first. Days outside the month are `None`.
    pub fn month_grid(&self) -> Vec<[Option<NaiveDate>; 7]> {
        month_grid(self.selected.year(), self.selected.month())
    }
}

/// Weeks of `year`/`month`, Monday first
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = first.weekday().num_days_from_monday() as usize;
    let mut day = first;

    while day.month() == month {
        week[slot] = Some(day);
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    if slot > 0 {
        weeks.push(week);
    }

    weeks
}
