//! Five-field crontab expressions: parsing, rendering and next-run preview.
//!
//! Day-of-month and day-of-week follow the classic vixie-cron rule: when both
//! are restricted a time matches if *either* does; otherwise both must match.

use std::fmt;
use std::str::FromStr;

use time::{Duration, OffsetDateTime, Time};

use super::ToolError;

/// Four years of minutes, enough to reach the next February 29th.
const SCAN_HORIZON_MINUTES: i64 = 4 * 366 * 24 * 60;

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    min: u8,
    max: u8,
    names: &'static [&'static str],
    /// First value `names[0]` stands for.
    names_offset: u8,
}

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
    names_offset: 0,
};
const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
    names_offset: 0,
};
const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day of month",
    min: 1,
    max: 31,
    names: &[],
    names_offset: 0,
};
const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &MONTH_NAMES,
    names_offset: 1,
};
const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day of week",
    min: 0,
    max: 7,
    names: &DAY_NAMES,
    names_offset: 0,
};

/// Bit set of the values a field allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ValueSet(u64);

impl ValueSet {
    fn contains(self, value: u8) -> bool {
        self.0 & (1u64 << value) != 0
    }

    fn insert(&mut self, value: u8) {
        self.0 |= 1u64 << value;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    source: String,
    minutes: ValueSet,
    hours: ValueSet,
    days_of_month: ValueSet,
    months: ValueSet,
    days_of_week: ValueSet,
    dom_restricted: bool,
    dow_restricted: bool,
}

impl CronExpression {
    pub fn parse(expression: &str) -> Result<Self, ToolError> {
        let trimmed = expression.trim();
        let expanded = match trimmed.to_ascii_lowercase().as_str() {
            "@yearly" | "@annually" => "0 0 1 1 *".to_string(),
            "@monthly" => "0 0 1 * *".to_string(),
            "@weekly" => "0 0 * * 0".to_string(),
            "@daily" | "@midnight" => "0 0 * * *".to_string(),
            "@hourly" => "0 * * * *".to_string(),
            _ => trimmed.to_string(),
        };
        let fail = |reason: String| ToolError::Cron {
            expression: trimmed.to_string(),
            reason,
        };

        let fields: Vec<&str> = expanded.split_whitespace().collect();
        let [minute, hour, dom, month, dow] = fields.as_slice() else {
            return Err(fail(format!("expected 5 fields, found {}", fields.len())));
        };

        let mut days_of_week = parse_field(dow, DAY_OF_WEEK).map_err(fail)?;
        if days_of_week.contains(7) {
            days_of_week.insert(0);
        }

        Ok(Self {
            source: trimmed.to_string(),
            minutes: parse_field(minute, MINUTE).map_err(fail)?,
            hours: parse_field(hour, HOUR).map_err(fail)?,
            days_of_month: parse_field(dom, DAY_OF_MONTH).map_err(fail)?,
            months: parse_field(month, MONTH).map_err(fail)?,
            days_of_week,
            dom_restricted: !dom.starts_with('*'),
            dow_restricted: !dow.starts_with('*'),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn day_matches(&self, at: OffsetDateTime) -> bool {
        if !self.months.contains(u8::from(at.month())) {
            return false;
        }
        let dom = self.days_of_month.contains(at.day());
        let dow = self
            .days_of_week
            .contains(at.weekday().number_days_from_sunday());
        match (self.dom_restricted, self.dow_restricted) {
            (true, true) => dom || dow,
            (true, false) => dom,
            (false, true) => dow,
            (false, false) => true,
        }
    }

    /// Whether the minute containing `at` fires, in `at`'s own offset.
    pub fn matches(&self, at: OffsetDateTime) -> bool {
        self.day_matches(at) && self.hours.contains(at.hour()) && self.minutes.contains(at.minute())
    }

    /// Up to `count` fire times strictly after `after`, scanning forward one
    /// minute at a time within a bounded horizon.
    pub fn next_runs(&self, after: OffsetDateTime, count: usize) -> Vec<OffsetDateTime> {
        let mut runs = Vec::with_capacity(count);
        let Some(mut cursor) = after
            .replace_second(0)
            .and_then(|at| at.replace_nanosecond(0))
            .ok()
            .map(|at| at + Duration::minutes(1))
        else {
            return runs;
        };
        let horizon = cursor + Duration::minutes(SCAN_HORIZON_MINUTES);

        while runs.len() < count && cursor < horizon {
            if !self.day_matches(cursor) {
                cursor = cursor.replace_time(Time::MIDNIGHT) + Duration::days(1);
                continue;
            }
            if !self.hours.contains(cursor.hour()) {
                cursor = cursor.replace_minute(0).unwrap_or(cursor) + Duration::hours(1);
                continue;
            }
            if self.minutes.contains(cursor.minute()) {
                runs.push(cursor);
            }
            cursor += Duration::minutes(1);
        }
        runs
    }
}

impl FromStr for CronExpression {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// A crontab line running `command` on `expression`.
pub fn crontab_line(expression: &CronExpression, command: &str) -> Result<String, ToolError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ToolError::invalid("command", "must not be empty"));
    }
    if command.contains('\n') {
        return Err(ToolError::invalid("command", "must be a single line"));
    }
    // `%` means newline to cron
    Ok(format!("{} {}", expression, command.replace('%', r"\%")))
}

fn parse_field(text: &str, spec: FieldSpec) -> Result<ValueSet, String> {
    let mut set = ValueSet(0);
    for item in text.split(',') {
        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: u8 = step
                    .parse()
                    .map_err(|_| format!("invalid step `{step}` in {} field", spec.name))?;
                if step == 0 {
                    return Err(format!("step must be positive in {} field", spec.name));
                }
                (range, step)
            }
            None => (item, 1),
        };

        let (start, end) = if range == "*" {
            (spec.min, spec.max)
        } else if let Some((low, high)) = range.split_once('-') {
            (parse_value(low, spec)?, parse_value(high, spec)?)
        } else {
            let value = parse_value(range, spec)?;
            // `5/15` runs from 5 to the end of the field
            if item.contains('/') {
                (value, spec.max)
            } else {
                (value, value)
            }
        };
        if start > end {
            return Err(format!(
                "range {start}-{end} is reversed in {} field",
                spec.name
            ));
        }

        let mut value = start;
        while value <= end {
            set.insert(value);
            match value.checked_add(step) {
                Some(next) => value = next,
                None => break,
            }
        }
    }
    Ok(set)
}

fn parse_value(token: &str, spec: FieldSpec) -> Result<u8, String> {
    let lowered = token.to_ascii_lowercase();
    let value = match spec.names.iter().position(|name| *name == lowered) {
        Some(index) => index as u8 + spec.names_offset,
        None => token
            .parse::<u8>()
            .map_err(|_| format!("invalid value `{token}` in {} field", spec.name))?,
    };
    if value < spec.min || value > spec.max {
        return Err(format!(
            "{value} is outside {}-{} in {} field",
            spec.min, spec.max, spec.name
        ));
    }
    Ok(value)
}
