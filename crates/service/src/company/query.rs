//! Query builder: translates the `filter` and `sort` request parameters
//! into a store query. Malformed input is a client error (`Parse`), never
//! a silently empty filter.

use models::company::{self, ImpactLevel};
use sea_orm::{ColumnTrait, QueryFilter, Select};
use serde_json::Value;

use crate::errors::ServiceError;

/// Exact-match conjunction over the filterable company fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub impact_level: Option<ImpactLevel>,
    pub category: Option<String>,
    pub status: Option<bool>,
    pub years_of_experience: Option<i32>,
}

impl CompanyFilter {
    pub fn apply(&self, mut finder: Select<company::Entity>) -> Select<company::Entity> {
        if let Some(name) = &self.name {
            finder = finder.filter(company::Column::Name.eq(name.clone()));
        }
        if let Some(level) = self.impact_level {
            finder = finder.filter(company::Column::ImpactLevel.eq(level));
        }
        if let Some(category) = &self.category {
            finder = finder.filter(company::Column::Category.eq(category.clone()));
        }
        if let Some(status) = self.status {
            finder = finder.filter(company::Column::Status.eq(status));
        }
        if let Some(years) = self.years_of_experience {
            finder = finder.filter(company::Column::YearsOfExperience.eq(years));
        }
        finder
    }
}

/// Parse the `filter` query parameter: a JSON object mapping field names
/// to exact-match values. Unknown keys and mistyped values are rejected.
pub fn parse_filter(raw: &str) -> Result<CompanyFilter, ServiceError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ServiceError::Parse(format!("filter is not valid JSON: {e}")))?;
    let Value::Object(map) = value else {
        return Err(ServiceError::Parse("filter must be a JSON object".into()));
    };

    let mut filter = CompanyFilter::default();
    for (key, value) in map {
        match key.as_str() {
            "name" => filter.name = Some(expect_string(&key, &value)?),
            "impactLevel" => {
                let s = expect_string(&key, &value)?;
                let level = ImpactLevel::parse(&s)
                    .map_err(|e| ServiceError::Parse(e.to_string()))?;
                filter.impact_level = Some(level);
            }
            "category" => filter.category = Some(expect_string(&key, &value)?),
            "status" => {
                let Value::Bool(b) = value else {
                    return Err(ServiceError::Parse("filter field 'status' must be a boolean".into()));
                };
                filter.status = Some(b);
            }
            "yearsOfExperience" => filter.years_of_experience = Some(expect_int(&key, &value)?),
            other => {
                return Err(ServiceError::Parse(format!("unknown filter field '{other}'")));
            }
        }
    }
    Ok(filter)
}

fn expect_string(key: &str, value: &Value) -> Result<String, ServiceError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ServiceError::Parse(format!("filter field '{key}' must be a string"))),
    }
}

fn expect_int(key: &str, value: &Value) -> Result<i32, ServiceError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| ServiceError::Parse(format!("filter field '{key}' must be an integer")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Name,
    ImpactLevel,
    YearsOfExperience,
    Category,
    Status,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "impactLevel" => Some(Self::ImpactLevel),
            "yearsOfExperience" => Some(Self::YearsOfExperience),
            "category" => Some(Self::Category),
            "status" => Some(Self::Status),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// Store column for native ordering. `ImpactLevel` is intentionally not
    /// ordered natively: its labels sort lexically (High < Low < Medium),
    /// which is wrong; the service post-sorts by rank instead.
    pub fn column(self) -> company::Column {
        match self {
            Self::Name => company::Column::Name,
            Self::ImpactLevel => company::Column::ImpactLevel,
            Self::YearsOfExperience => company::Column::YearsOfExperience,
            Self::Category => company::Column::Category,
            Self::Status => company::Column::Status,
            Self::CreatedAt => company::Column::CreatedAt,
            Self::UpdatedAt => company::Column::UpdatedAt,
        }
    }
}

/// Single-field sort directive; a leading `-` marks descending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

pub fn parse_sort(raw: &str) -> Result<SortSpec, ServiceError> {
    let (name, descending) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    let field = SortField::parse(name)
        .ok_or_else(|| ServiceError::Parse(format!("unknown sort field '{name}'")))?;
    Ok(SortSpec { field, descending })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_match_conjunction() {
        let f = parse_filter(r#"{"category": "Tech", "impactLevel": "High", "status": true}"#)
            .expect("parse");
        assert_eq!(f.category.as_deref(), Some("Tech"));
        assert_eq!(f.impact_level, Some(ImpactLevel::High));
        assert_eq!(f.status, Some(true));
        assert_eq!(f.name, None);
    }

    #[test]
    fn parses_years_filter() {
        let f = parse_filter(r#"{"yearsOfExperience": 12}"#).expect("parse");
        assert_eq!(f.years_of_experience, Some(12));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_filter("{not json"), Err(ServiceError::Parse(_))));
        assert!(matches!(parse_filter(r#"["list"]"#), Err(ServiceError::Parse(_))));
    }

    #[test]
    fn rejects_unknown_field() {
        assert!(matches!(
            parse_filter(r#"{"founded": 1990}"#),
            Err(ServiceError::Parse(_))
        ));
    }

    #[test]
    fn rejects_mistyped_values() {
        assert!(matches!(parse_filter(r#"{"status": "yes"}"#), Err(ServiceError::Parse(_))));
        assert!(matches!(parse_filter(r#"{"name": 42}"#), Err(ServiceError::Parse(_))));
        assert!(matches!(
            parse_filter(r#"{"yearsOfExperience": 1.5}"#),
            Err(ServiceError::Parse(_))
        ));
        assert!(matches!(
            parse_filter(r#"{"impactLevel": "Critical"}"#),
            Err(ServiceError::Parse(_))
        ));
    }

    #[test]
    fn parses_sort_directive() {
        assert_eq!(
            parse_sort("yearsOfExperience").unwrap(),
            SortSpec { field: SortField::YearsOfExperience, descending: false }
        );
        assert_eq!(
            parse_sort("-impactLevel").unwrap(),
            SortSpec { field: SortField::ImpactLevel, descending: true }
        );
        assert!(matches!(parse_sort("-nope"), Err(ServiceError::Parse(_))));
    }
}
