use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use service::company::query::{self, CompanyFilter, SortSpec};
use service::company::report;
use service::company::service::{self as companies, CreateCompany, UpdateCompany};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyInput {
    pub name: String,
    pub impact_level: String,
    pub years_of_experience: i32,
    pub category: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCompanyInput {
    pub name: Option<String>,
    pub impact_level: Option<String>,
    pub years_of_experience: Option<i32>,
    pub category: Option<String>,
}

fn parse_list_query(q: &ListQuery) -> Result<(Option<CompanyFilter>, Option<SortSpec>), JsonApiError> {
    let filter = match &q.filter {
        Some(raw) => Some(query::parse_filter(raw)?),
        None => None,
    };
    let sort = match &q.sort {
        Some(raw) => Some(query::parse_sort(raw)?),
        None => None,
    };
    Ok((filter, sort))
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<CreateCompanyInput>,
) -> Result<(StatusCode, Json<models::company::Model>), JsonApiError> {
    let created = companies::create_company(
        &state.db,
        &CreateCompany {
            name: input.name,
            impact_level: input.impact_level,
            years_of_experience: input.years_of_experience,
            category: input.category,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<models::company::Model>>, JsonApiError> {
    let (filter, sort) = parse_list_query(&q)?;
    let rows = companies::list_companies(&state.db, filter, sort).await?;
    info!(count = rows.len(), "list companies");
    Ok(Json(rows))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::company::Model>, JsonApiError> {
    match companies::get_company(&state.db, id).await? {
        Some(m) => Ok(Json(m)),
        None => Err(JsonApiError::not_found("company not found")),
    }
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCompanyInput>,
) -> Result<Json<models::company::Model>, JsonApiError> {
    let updated = companies::update_company(
        &state.db,
        id,
        &UpdateCompany {
            name: input.name,
            impact_level: input.impact_level,
            years_of_experience: input.years_of_experience,
            category: input.category,
        },
    )
    .await?;
    Ok(Json(updated))
}

/// Same filter/sort surface as the listing, encoded as an xlsx attachment.
pub async fn report(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, JsonApiError> {
    let (filter, sort) = parse_list_query(&q)?;
    let rows = companies::list_companies(&state.db, filter, sort).await?;
    let bytes = report::build_xlsx(&rows)?;
    info!(rows = rows.len(), bytes = bytes.len(), "company report generated");

    let headers = [
        (header::CONTENT_TYPE, report::REPORT_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report::REPORT_FILENAME),
        ),
    ];
    Ok((headers, bytes))
}
