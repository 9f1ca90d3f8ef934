use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::content::{ContentItem, FieldKey, FieldValue};

use super::ListError;
use super::schema::{ListSchema, SortKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unsupported sort direction `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: FieldKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: FieldKey, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Normalized sort key; `Missing` orders before everything else.
#[derive(Debug, Clone, Copy)]
enum SortValue<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    Millis(i128),
}

impl<'a> SortValue<'a> {
    fn from_field(value: FieldValue<'a>, kind: SortKind) -> Self {
        match (kind, value) {
            (SortKind::Text, FieldValue::Text(text)) => SortValue::Text(text),
            (SortKind::Text, FieldValue::List(items)) => items
                .first()
                .map_or(SortValue::Missing, |first| SortValue::Text(first)),
            (SortKind::Numeric, FieldValue::Number(number)) if !number.is_nan() => {
                SortValue::Number(number)
            }
            (SortKind::Timestamp, FieldValue::Timestamp(at)) => {
                SortValue::Millis(at.unix_timestamp_nanos() / 1_000_000)
            }
            _ => SortValue::Missing,
        }
    }
}

fn compare_sort_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Missing, SortValue::Missing) => Ordering::Equal,
        (SortValue::Missing, _) => Ordering::Less,
        (_, SortValue::Missing) => Ordering::Greater,
        (SortValue::Text(a), SortValue::Text(b)) => collate(a, b),
        (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(&b),
        (SortValue::Millis(a), SortValue::Millis(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// Ascending comparison of two field values under `kind`.
pub fn compare_values(a: FieldValue<'_>, b: FieldValue<'_>, kind: SortKind) -> Ordering {
    compare_sort_values(
        SortValue::from_field(a, kind),
        SortValue::from_field(b, kind),
    )
}

/// Case-folded primary order with the raw strings as tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

pub struct SortEngine<'s> {
    schema: &'s ListSchema,
}

impl<'s> SortEngine<'s> {
    pub fn new(schema: &'s ListSchema) -> Self {
        Self { schema }
    }

    pub fn validate(&self, spec: SortSpec) -> Result<SortKind, ListError> {
        self.schema
            .sort_kind(spec.field)
            .ok_or(ListError::UnsupportedField {
                kind: self.schema.kind,
                field: spec.field,
                usage: "sort key",
            })
    }

    /// Stable in-place sort of borrowed items.
    pub fn apply<T: ContentItem>(&self, items: &mut [&T], spec: SortSpec) -> Result<(), ListError> {
        let kind = self.validate(spec)?;
        items.sort_by(|a, b| {
            let ordering = compare_values(a.field(spec.field), b.field(spec.field), kind);
            match spec.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hackerthink_api_types::{Interview, Product};
    use serde_json::json;

    use super::*;
    use crate::application::listing::schema::schema_for;
    use crate::domain::content::ContentKind;

    fn interviews(value: serde_json::Value) -> Vec<Interview> {
        serde_json::from_value(value).expect("interviews")
    }

    fn ids<T: ContentItem>(items: &[&T]) -> Vec<String> {
        items.iter().map(|item| item.id().to_string()).collect()
    }

    #[test]
    fn missing_timestamps_sort_first_ascending() {
        let items = interviews(json!([
            { "id": "a", "title": "A", "status": "draft", "created_at": "2024-03-01T00:00:00Z" },
            { "id": "b", "title": "B", "status": "draft", "created_at": null },
            { "id": "c", "title": "C", "status": "draft", "created_at": "2024-01-01T00:00:00Z" }
        ]));
        let engine = SortEngine::new(schema_for(ContentKind::Interviews));
        let mut refs: Vec<&Interview> = items.iter().collect();

        engine
            .apply(&mut refs, SortSpec::new(FieldKey::CreatedAt, SortDirection::Asc))
            .expect("sortable");
        assert_eq!(ids(&refs), ["b", "c", "a"]);

        engine
            .apply(&mut refs, SortSpec::new(FieldKey::CreatedAt, SortDirection::Desc))
            .expect("sortable");
        assert_eq!(ids(&refs), ["a", "c", "b"]);
    }

    #[test]
    fn equal_keys_keep_their_relative_order() {
        let items = interviews(json!([
            { "id": "1", "title": "Same", "status": "draft", "view_count": 5 },
            { "id": "2", "title": "Same", "status": "draft", "view_count": 5 },
            { "id": "3", "title": "Other", "status": "draft", "view_count": "9" }
        ]));
        let engine = SortEngine::new(schema_for(ContentKind::Interviews));
        let mut refs: Vec<&Interview> = items.iter().collect();

        engine
            .apply(&mut refs, SortSpec::new(FieldKey::ViewCount, SortDirection::Asc))
            .expect("sortable");
        assert_eq!(ids(&refs), ["1", "2", "3"]);
    }

    #[test]
    fn numeric_strings_sort_numerically() {
        let items: Vec<Product> = serde_json::from_value(json!([
            { "id": "p1", "name": "A", "status": "draft", "rating": "10" },
            { "id": "p2", "name": "B", "status": "draft", "rating": 9.5 },
            { "id": "p3", "name": "C", "status": "draft", "rating": "2" }
        ]))
        .expect("products");
        let engine = SortEngine::new(schema_for(ContentKind::Products));
        let mut refs: Vec<&Product> = items.iter().collect();

        engine
            .apply(&mut refs, SortSpec::new(FieldKey::Rating, SortDirection::Desc))
            .expect("sortable");
        assert_eq!(ids(&refs), ["p1", "p2", "p3"]);
    }

    #[test]
    fn text_collation_ignores_case_first() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Zeta", "alpha"), Ordering::Greater);
        assert_ne!(collate("Apple", "apple"), Ordering::Equal);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn fields_outside_whitelist_are_rejected() {
        let engine = SortEngine::new(schema_for(ContentKind::Interviews));
        let err = engine
            .validate(SortSpec::new(FieldKey::Rating, SortDirection::Asc))
            .expect_err("interviews have no rating");
        assert!(matches!(
            err,
            ListError::UnsupportedField { field: FieldKey::Rating, .. }
        ));
    }

    #[test]
    fn direction_parses_long_forms() {
        assert_eq!("ASC".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("descending".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
