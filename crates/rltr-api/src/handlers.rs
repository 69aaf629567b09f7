use crate::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use rltr_core::{Collection, FilterQuery, FilterSchema, Page, PagedResult, Record, RecordId};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
pub struct LiveResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ok: bool,
    pub collections: usize,
    pub records: usize,
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub name: Collection,
    pub records: usize,
    pub schema: FilterSchema,
}

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<CollectionSummary>,
}

pub async fn live() -> Json<LiveResponse> {
    Json(LiveResponse { ok: true })
}

pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ok: !state.catalog.is_empty(),
        collections: state.catalog.len(),
        records: state.catalog.entries().map(|entry| entry.store.len()).sum(),
        uptime_seconds: state.uptime().num_seconds(),
    })
}

pub async fn list_collections(State(state): State<Arc<AppState>>) -> Json<CollectionsResponse> {
    let collections = state
        .catalog
        .entries()
        .map(|entry| CollectionSummary {
            name: entry.collection,
            records: entry.store.len(),
            schema: entry.schema.clone(),
        })
        .collect();
    Json(CollectionsResponse { collections })
}

/// `GET /{collection}`: search, constrain and page one collection
#[instrument(skip(state, params), fields(params = params.len()))]
pub async fn list_records(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<Json<PagedResult<Record>>> {
    let entry = state.catalog.resolve(&collection)?;
    let limit = paging_param(&params, "limit")?;
    if limit == Some(0) {
        return Err(ApiError::validation("limit must be at least 1", Some("limit")));
    }
    let page = Page::new(limit, paging_param(&params, "offset")?, state.page_limits);
    let filter = FilterQuery::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    let outcome = entry.search(&filter);
    debug!(matched = outcome.len(), limit = page.limit, offset = page.offset, "Listed records");
    Ok(Json(outcome.page(page)))
}

/// `GET /{collection}/{id}`
#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let entry = state.catalog.resolve(&collection)?;
    let id: RecordId = id
        .parse()
        .map_err(|_| ApiError::validation(format!("record id '{id}' is not a number"), Some("id")))?;
    entry
        .store
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("{collection} record {id}")))
}

fn paging_param(params: &[(String, String)], name: &str) -> ApiResult<Option<usize>> {
    params
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .filter(|(_, value)| !value.is_empty())
        .map(|(_, value)| {
            value.parse().map_err(|_| {
                ApiError::validation(format!("{name} must be a non-negative integer"), Some(name))
            })
        })
        .transpose()
}
