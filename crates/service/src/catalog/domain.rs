use serde::{Deserialize, Serialize};

use models::car::{self, CarInput};

/// Listing order. Unknown or absent keys fall back to `PriceAsc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    PriceAsc,
    PriceDesc,
    YearAsc,
    YearDesc,
}

impl SortOrder {
    pub fn parse(key: Option<&str>) -> Self {
        match key {
            Some("price_desc") => SortOrder::PriceDesc,
            Some("year_asc") => SortOrder::YearAsc,
            Some("year_desc") => SortOrder::YearDesc,
            _ => SortOrder::PriceAsc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PriceAsc => "price_asc",
            SortOrder::PriceDesc => "price_desc",
            SortOrder::YearAsc => "year_asc",
            SortOrder::YearDesc => "year_desc",
        }
    }
}

/// Listing filter: `search` is matched as a case-sensitive substring of
/// make or model.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CarQuery {
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl CarQuery {
    /// Empty search strings are treated as absent.
    pub fn new(search: Option<String>, sort: Option<&str>) -> Self {
        Self { search: search.filter(|s| !s.is_empty()), sort: SortOrder::parse(sort) }
    }

    pub fn matches(&self, c: &car::Model) -> bool {
        match &self.search {
            Some(s) => c.make.contains(s.as_str()) || c.model.contains(s.as_str()),
            None => true,
        }
    }
}

/// Edit-form submission: whole-record replacement of car `id`, guarded by
/// the `version` that was read when the form was produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CarUpdate {
    pub id: i32,
    /// Version the edit form was read at; required.
    pub version: i32,
    #[serde(flatten)]
    pub fields: CarInput,
}

impl CarUpdate {
    pub fn from_model(m: car::Model) -> Self {
        Self { id: m.id, version: m.version, fields: m.into() }
    }
}

/// Result of an update attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
    Updated(car::Model),
    /// Identifier mismatch, or the record is gone.
    NotFound,
    /// The record still exists but was changed since it was read.
    Conflict,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_parse_with_price_ascending_default() {
        assert_eq!(SortOrder::parse(Some("price_desc")), SortOrder::PriceDesc);
        assert_eq!(SortOrder::parse(Some("year_asc")), SortOrder::YearAsc);
        assert_eq!(SortOrder::parse(Some("year_desc")), SortOrder::YearDesc);
        assert_eq!(SortOrder::parse(Some("price_asc")), SortOrder::PriceAsc);
        assert_eq!(SortOrder::parse(Some("YEAR_DESC")), SortOrder::PriceAsc);
        assert_eq!(SortOrder::parse(Some("mileage")), SortOrder::PriceAsc);
        assert_eq!(SortOrder::parse(None), SortOrder::PriceAsc);
    }

    #[test]
    fn empty_search_is_no_filter() {
        assert_eq!(CarQuery::new(Some(String::new()), None), CarQuery::new(None, None));
    }

    #[test]
    fn update_payload_flattens_fields() {
        let u: CarUpdate = serde_json::from_str(
            r#"{"id":7,"version":2,"make":"Mazda","model":"3","year":2019,"price":12000}"#,
        ).unwrap();
        assert_eq!(u.id, 7);
        assert_eq!(u.version, 2);
        assert_eq!(u.fields.make, "Mazda");
        assert_eq!(u.fields.year, Some(2019));
    }

    #[test]
    fn update_payload_requires_version() {
        let err = serde_json::from_str::<CarUpdate>(r#"{"id":7,"make":"Mazda","model":"3"}"#).unwrap_err();
        assert!(err.to_string().contains("version"));
    }
}
