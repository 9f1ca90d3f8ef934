use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use time::{Date, Duration, Month, OffsetDateTime};

use crate::domain::content::{ContentItem, FieldKey, FieldValue};
use crate::util::timezone::{localized_date, start_of_local_day};

use super::ListError;
use super::schema::ListSchema;

/// Exact-filter value meaning "no constraint".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    Last90Days,
    ThisYear,
}

impl DatePreset {
    pub fn as_str(self) -> &'static str {
        match self {
            DatePreset::Today => "today",
            DatePreset::Yesterday => "yesterday",
            DatePreset::Last7Days => "last7days",
            DatePreset::Last30Days => "last30days",
            DatePreset::Last90Days => "last90days",
            DatePreset::ThisYear => "thisyear",
        }
    }
}

impl fmt::Display for DatePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatePreset {
    type Err = ListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "today" => Ok(DatePreset::Today),
            "yesterday" => Ok(DatePreset::Yesterday),
            "last7days" => Ok(DatePreset::Last7Days),
            "last30days" => Ok(DatePreset::Last30Days),
            "last90days" => Ok(DatePreset::Last90Days),
            "thisyear" => Ok(DatePreset::ThisYear),
            _ => Err(ListError::InvalidDateRange(format!(
                "unknown preset `{}`",
                value.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    Any,
    Preset(DatePreset),
    Custom {
        from: Option<Date>,
        to: Option<Date>,
    },
}

/// Resolved bounds; both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

impl DateWindow {
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start.is_none_or(|start| at >= start) && self.end.is_none_or(|end| at <= end)
    }
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            DateRange::Any | DateRange::Custom { from: None, to: None }
        )
    }

    /// Window relative to `now`, with calendar days taken in `tz`.
    /// Presets only set a lower bound.
    pub fn resolve(&self, now: OffsetDateTime, tz: Tz) -> Option<DateWindow> {
        if !self.is_active() {
            return None;
        }
        let today = localized_date(now, tz);
        let window = match *self {
            DateRange::Any => return None,
            DateRange::Preset(preset) => {
                let start = match preset {
                    DatePreset::Today => start_of_local_day(today, tz),
                    DatePreset::Yesterday => {
                        start_of_local_day(today.previous_day().unwrap_or(today), tz)
                    }
                    DatePreset::Last7Days => now - Duration::days(7),
                    DatePreset::Last30Days => now - Duration::days(30),
                    DatePreset::Last90Days => now - Duration::days(90),
                    DatePreset::ThisYear => {
                        let january_first =
                            Date::from_calendar_date(today.year(), Month::January, 1)
                                .unwrap_or(today);
                        start_of_local_day(january_first, tz)
                    }
                };
                DateWindow {
                    start: Some(start),
                    end: None,
                }
            }
            DateRange::Custom { from, to } => DateWindow {
                start: from.map(|day| start_of_local_day(day, tz)),
                end: to.map(|day| end_of_local_day(day, tz)),
            },
        };
        Some(window)
    }
}

fn end_of_local_day(day: Date, tz: Tz) -> OffsetDateTime {
    match day.next_day() {
        Some(next) => start_of_local_day(next, tz) - Duration::nanoseconds(1),
        None => start_of_local_day(day, tz) + Duration::days(1) - Duration::nanoseconds(1),
    }
}

/// The combined, ANDed filter state of one list view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    search: String,
    exact: BTreeMap<FieldKey, String>,
    date_range: DateRange,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.set_search(term);
        self
    }

    pub fn with_exact(mut self, key: FieldKey, value: impl Into<String>) -> Self {
        self.set_exact(key, value);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Set one exact filter; `all` or an empty value removes it.
    pub fn set_exact(&mut self, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        if is_unconstrained(&value) {
            self.exact.remove(&key);
        } else {
            self.exact.insert(key, value);
        }
    }

    pub fn exact(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.exact.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn exact_value(&self, key: FieldKey) -> Option<&str> {
        self.exact.get(&key).map(String::as_str)
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.date_range = range;
    }

    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.exact.is_empty() && !self.date_range.is_active()
    }
}

pub fn is_unconstrained(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

pub struct FilterEngine<'s> {
    schema: &'s ListSchema,
    tz: Tz,
}

impl<'s> FilterEngine<'s> {
    pub fn new(schema: &'s ListSchema, tz: Tz) -> Self {
        Self { schema, tz }
    }

    /// Reject criteria the schema does not declare.
    pub fn validate(&self, criteria: &FilterCriteria) -> Result<(), ListError> {
        if let Some((field, _)) = criteria
            .exact()
            .find(|(field, _)| !self.schema.supports_exact(*field))
        {
            return Err(ListError::UnsupportedField {
                kind: self.schema.kind,
                field,
                usage: "filter",
            });
        }
        if criteria.date_range().is_active() && self.schema.date_field().is_none() {
            return Err(ListError::UnsupportedDateRange {
                kind: self.schema.kind,
            });
        }
        if let DateRange::Custom {
            from: Some(from),
            to: Some(to),
        } = criteria.date_range()
            && from > to
        {
            return Err(ListError::InvalidDateRange(format!(
                "`from` {from} is after `to` {to}"
            )));
        }
        Ok(())
    }

    /// Items passing every active criterion, in source order.
    pub fn apply<'a, T: ContentItem>(
        &self,
        items: &'a [T],
        criteria: &FilterCriteria,
        now: OffsetDateTime,
    ) -> Result<Vec<&'a T>, ListError> {
        self.validate(criteria)?;
        let needle = criteria.search().trim().to_lowercase();
        let window = self
            .schema
            .date_field()
            .zip(criteria.date_range().resolve(now, self.tz));

        Ok(items
            .iter()
            .filter(|item| needle.is_empty() || self.matches_search(*item, &needle))
            .filter(|item| {
                criteria
                    .exact()
                    .all(|(field, wanted)| matches_exact(item.field(field), wanted))
            })
            .filter(|item| {
                window.is_none_or(|(field, window)| match item.field(field) {
                    FieldValue::Timestamp(at) => window.contains(at),
                    _ => false,
                })
            })
            .collect())
    }

    fn matches_search<T: ContentItem>(&self, item: &T, needle: &str) -> bool {
        self.schema
            .search_fields()
            .any(|field| contains_lowercase(item.field(field), needle))
    }
}

fn contains_lowercase(value: FieldValue<'_>, needle: &str) -> bool {
    match value {
        FieldValue::Text(text) => text.to_lowercase().contains(needle),
        FieldValue::List(values) => values
            .iter()
            .any(|value| value.to_lowercase().contains(needle)),
        _ => false,
    }
}

fn matches_exact(value: FieldValue<'_>, wanted: &str) -> bool {
    match value {
        FieldValue::Text(text) => text == wanted,
        FieldValue::List(values) => values.iter().any(|value| value == wanted),
        _ => false,
    }
}
