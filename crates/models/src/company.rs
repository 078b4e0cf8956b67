use chrono::Utc;
use sea_orm::{entity::prelude::*, ActiveModelTrait, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{self, ModelError};

/// Impact classification with a business-defined rank order.
/// High outranks Medium outranks Low; sorting by this field must follow
/// the rank table, never the lexical order of the labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ImpactLevel {
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Medium")]
    Medium,
    #[sea_orm(string_value = "Low")]
    Low,
}

impl ImpactLevel {
    /// Fixed rank table consulted by the sort comparator (index = rank).
    pub const RANKED: [ImpactLevel; 3] = [ImpactLevel::High, ImpactLevel::Medium, ImpactLevel::Low];

    pub fn rank(self) -> usize {
        Self::RANKED
            .iter()
            .position(|l| *l == self)
            .unwrap_or(Self::RANKED.len())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ImpactLevel::High => "High",
            ImpactLevel::Medium => "Medium",
            ImpactLevel::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "High" => Ok(ImpactLevel::High),
            "Medium" => Ok(ImpactLevel::Medium),
            "Low" => Ok(ImpactLevel::Low),
            other => Err(ModelError::Validation(format!(
                "impactLevel must be one of High, Medium, Low (got '{other}')"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "company")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub impact_level: ImpactLevel,
    /// Raw experience in years. Legacy foundation-year values are rewritten
    /// once by the `normalize_company_experience` migration.
    pub years_of_experience: i32,
    pub category: String,
    pub status: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

pub fn validate_category(category: &str) -> Result<(), ModelError> {
    if category.trim().is_empty() {
        return Err(ModelError::Validation("category required".into()));
    }
    Ok(())
}

pub fn validate_experience(years: i32) -> Result<(), ModelError> {
    if years < 0 {
        return Err(ModelError::Validation("yearsOfExperience must be non-negative".into()));
    }
    Ok(())
}

pub async fn find_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    impact_level: ImpactLevel,
    years_of_experience: i32,
    category: &str,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_experience(years_of_experience)?;
    validate_category(category)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        impact_level: Set(impact_level),
        years_of_experience: Set(years_of_experience),
        category: Set(category.to_string()),
        status: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| {
        if errors::is_unique_violation(&e) {
            ModelError::DuplicateName(format!("a company named '{name}' already exists"))
        } else {
            ModelError::Db(e.to_string())
        }
    })
}
