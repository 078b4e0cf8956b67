use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Order, QueryOrder, Set};
use tracing::info;
use uuid::Uuid;

use chrono::Utc;
use models::company::{self, Entity as CompanyEntity, ImpactLevel};
use models::errors::is_unique_violation;

use super::query::{CompanyFilter, SortField, SortSpec};
use crate::errors::ServiceError;

#[derive(Debug, Clone)]
pub struct CreateCompany {
    pub name: String,
    pub impact_level: String,
    pub years_of_experience: i32,
    pub category: String,
}

/// Partial update. A `None` field is left unchanged; a present string that
/// is blank after trimming is also left unchanged, while a present number
/// is always applied (an explicit 0 overwrites).
#[derive(Debug, Clone, Default)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub impact_level: Option<String>,
    pub years_of_experience: Option<i32>,
    pub category: Option<String>,
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.trim().is_empty())
}

/// Register a company. Name uniqueness is pre-checked for a friendly error;
/// the unique index still backstops the race between check and insert.
pub async fn create_company(
    db: &DatabaseConnection,
    input: &CreateCompany,
) -> Result<company::Model, ServiceError> {
    let level = ImpactLevel::parse(&input.impact_level)?;
    if company::find_by_name(db, &input.name).await?.is_some() {
        return Err(ServiceError::DuplicateName(format!(
            "a company named '{}' already exists",
            input.name
        )));
    }
    let created =
        company::create(db, &input.name, level, input.years_of_experience, &input.category).await?;
    info!(id = %created.id, name = %created.name, "company registered");
    Ok(created)
}

/// Point lookup by id; absence is `None`, not an error.
pub async fn get_company(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<company::Model>, ServiceError> {
    Ok(company::find_by_id(db, id).await?)
}

/// Apply the provided fields over the existing record.
pub async fn update_company(
    db: &DatabaseConnection,
    id: Uuid,
    input: &UpdateCompany,
) -> Result<company::Model, ServiceError> {
    let current = company::find_by_id(db, id).await?;
    let Some(existing) = current else {
        return Err(ServiceError::not_found("company"));
    };

    let mut am: company::ActiveModel = existing.into();
    if let Some(name) = non_blank(input.name.as_deref()) {
        company::validate_name(name)?;
        am.name = Set(name.to_string());
    }
    if let Some(level) = non_blank(input.impact_level.as_deref()) {
        am.impact_level = Set(ImpactLevel::parse(level)?);
    }
    if let Some(years) = input.years_of_experience {
        company::validate_experience(years)?;
        am.years_of_experience = Set(years);
    }
    if let Some(category) = non_blank(input.category.as_deref()) {
        am.category = Set(category.to_string());
    }
    am.updated_at = Set(Utc::now().into());

    let updated = am.update(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            ServiceError::DuplicateName("another company already uses that name".into())
        } else {
            ServiceError::Db(e.to_string())
        }
    })?;
    info!(id = %updated.id, "company updated");
    Ok(updated)
}

/// Filtered, sorted listing.
///
/// Every field sorts natively in the store except `impactLevel`, whose
/// labels would sort lexically (High < Low < Medium). Those rows are
/// post-sorted in memory against the fixed rank table instead.
pub async fn list_companies(
    db: &DatabaseConnection,
    filter: Option<CompanyFilter>,
    sort: Option<SortSpec>,
) -> Result<Vec<company::Model>, ServiceError> {
    let mut finder = CompanyEntity::find();
    if let Some(f) = &filter {
        finder = f.apply(finder);
    }

    match sort {
        Some(spec) if spec.field == SortField::ImpactLevel => {
            let mut rows = finder.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
            rank_sort(&mut rows, spec.descending);
            Ok(rows)
        }
        Some(spec) => {
            let order = if spec.descending { Order::Desc } else { Order::Asc };
            finder = finder.order_by(spec.field.column(), order);
            finder.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))
        }
        None => finder.all(db).await.map_err(|e| ServiceError::Db(e.to_string())),
    }
}

/// Stable sort keyed by rank position in `ImpactLevel::RANKED`; the
/// comparison itself is reversed for descending so ties keep store order.
fn rank_sort(rows: &mut [company::Model], descending: bool) {
    rows.sort_by(|a, b| {
        let (ra, rb) = (a.impact_level.rank(), b.impact_level.rank());
        if descending {
            rb.cmp(&ra)
        } else {
            ra.cmp(&rb)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk(name: &str, level: ImpactLevel) -> company::Model {
        let now = Utc::now().into();
        company::Model {
            id: Uuid::new_v4(),
            name: name.into(),
            impact_level: level,
            years_of_experience: 10,
            category: "Tech".into(),
            status: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn ascending_follows_rank_table_not_alphabet() {
        let mut rows = vec![
            mk("a", ImpactLevel::Low),
            mk("b", ImpactLevel::High),
            mk("c", ImpactLevel::Medium),
        ];
        rank_sort(&mut rows, false);
        let levels: Vec<_> = rows.iter().map(|c| c.impact_level).collect();
        assert_eq!(levels, vec![ImpactLevel::High, ImpactLevel::Medium, ImpactLevel::Low]);
    }

    #[test]
    fn descending_reverses_rank_comparison() {
        let mut rows = vec![
            mk("a", ImpactLevel::Medium),
            mk("b", ImpactLevel::Low),
            mk("c", ImpactLevel::High),
        ];
        rank_sort(&mut rows, true);
        let levels: Vec<_> = rows.iter().map(|c| c.impact_level).collect();
        assert_eq!(levels, vec![ImpactLevel::Low, ImpactLevel::Medium, ImpactLevel::High]);
    }

    #[test]
    fn rank_sort_keeps_store_order_for_ties() {
        let mut rows = vec![
            mk("first", ImpactLevel::High),
            mk("second", ImpactLevel::High),
            mk("third", ImpactLevel::Low),
        ];
        rank_sort(&mut rows, false);
        assert_eq!(rows[0].name, "first");
        assert_eq!(rows[1].name, "second");
    }

    #[test]
    fn blank_strings_are_treated_as_absent() {
        assert_eq!(non_blank(Some("Tech")), Some("Tech"));
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    mod db {
        use super::*;
        use crate::company::query::{parse_filter, parse_sort};
        use crate::test_support::get_db;

        #[tokio::test]
        async fn company_crud_flow() -> Result<(), anyhow::Error> {
            if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
                return Ok(());
            }
            let db = get_db().await?;

            let name = format!("svc-crud-{}", Uuid::new_v4());
            let created = create_company(
                &db,
                &CreateCompany {
                    name: name.clone(),
                    impact_level: "Medium".into(),
                    years_of_experience: 7,
                    category: "Food".into(),
                },
            )
            .await?;
            assert_eq!(created.years_of_experience, 7);
            assert!(created.status);

            // Duplicate registration is rejected and leaves one record.
            let dup = create_company(
                &db,
                &CreateCompany {
                    name: name.clone(),
                    impact_level: "Low".into(),
                    years_of_experience: 1,
                    category: "Food".into(),
                },
            )
            .await;
            assert!(matches!(dup, Err(ServiceError::DuplicateName(_))));

            let found = get_company(&db, created.id).await?.expect("company exists");
            assert_eq!(found.name, name);

            // Blank category is skipped; explicit zero experience is applied.
            let updated = update_company(
                &db,
                created.id,
                &UpdateCompany {
                    category: Some(String::new()),
                    years_of_experience: Some(0),
                    ..Default::default()
                },
            )
            .await?;
            assert_eq!(updated.category, "Food");
            assert_eq!(updated.years_of_experience, 0);

            // Unknown id maps to NotFound without altering state.
            let missing = update_company(&db, Uuid::new_v4(), &UpdateCompany::default()).await;
            assert!(matches!(missing, Err(ServiceError::NotFound(_))));

            let filter = parse_filter(&format!(r#"{{"name": "{name}"}}"#))?;
            let listed = list_companies(&db, Some(filter), Some(parse_sort("-createdAt")?)).await?;
            assert_eq!(listed.len(), 1);
            assert_eq!(listed[0].id, created.id);

            CompanyEntity::delete_by_id(created.id).exec(&db).await?;
            Ok(())
        }

        #[tokio::test]
        async fn impact_sort_orders_by_rank() -> Result<(), anyhow::Error> {
            if std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err() {
                return Ok(());
            }
            let db = get_db().await?;

            let tag = Uuid::new_v4().to_string();
            let mut ids = Vec::new();
            for (suffix, level) in [("low", "Low"), ("high", "High"), ("medium", "Medium")] {
                let created = create_company(
                    &db,
                    &CreateCompany {
                        name: format!("svc-sort-{tag}-{suffix}"),
                        impact_level: level.into(),
                        years_of_experience: 3,
                        category: format!("sort-{tag}"),
                    },
                )
                .await?;
                ids.push(created.id);
            }

            let filter = parse_filter(&format!(r#"{{"category": "sort-{tag}"}}"#))?;
            let asc =
                list_companies(&db, Some(filter.clone()), Some(parse_sort("impactLevel")?)).await?;
            let levels: Vec<_> = asc.iter().map(|c| c.impact_level).collect();
            assert_eq!(levels, vec![ImpactLevel::High, ImpactLevel::Medium, ImpactLevel::Low]);

            let desc =
                list_companies(&db, Some(filter), Some(parse_sort("-impactLevel")?)).await?;
            let levels: Vec<_> = desc.iter().map(|c| c.impact_level).collect();
            assert_eq!(levels, vec![ImpactLevel::Low, ImpactLevel::Medium, ImpactLevel::High]);

            for id in ids {
                CompanyEntity::delete_by_id(id).exec(&db).await?;
            }
            Ok(())
        }
    }
}
