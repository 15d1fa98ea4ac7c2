//! Generic CRUD plumbing shared by every managed entity.
//!
//! Each entity binds its queries to the [`Resource`] trait (row shape,
//! payload shape, sort whitelist, dependent checks) and the handlers here
//! provide the list, add, fetch, update and delete flows once for all of
//! them. Routes follow the `/{slug}_list/` convention:
//!
//! | Method | Path                        | Action                     |
//! |--------|-----------------------------|----------------------------|
//! | GET    | `/{slug}_list/`             | paginated, filterable list |
//! | POST   | `/{slug}_list/add`          | create                     |
//! | GET    | `/{slug}_list/{id}`         | fetch one                  |
//! | PUT    | `/{slug}_list/{id}`         | update                     |
//! | GET    | `/{slug}_list/{id}/delete`  | delete confirmation data   |
//! | POST   | `/{slug}_list/{id}/delete`  | perform delete             |

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{DatabaseConnection, EntityTrait, PrimaryKeyTrait};
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::app::AppContext;
use crate::error::{AppError, Result};
use crate::listing::{ListParams, Page};
use crate::validation::ValidatedJson;

mod college;
mod org_member;
mod organization;
mod program;
mod student;

pub use college::{CollegePayload, CollegeRow, Colleges};
pub use org_member::{OrgMemberPayload, OrgMemberRow, OrgMembers};
pub use organization::{OrganizationPayload, OrganizationRow, Organizations};
pub use program::{ProgramPayload, ProgramRow, Programs};
pub use student::{StudentPayload, StudentRow, Students};

/// Storage binding for one managed entity.
///
/// Implementations supply the queries; the generic handlers in this module
/// supply the HTTP flows on top of them.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Row shape returned by list and fetch responses.
    type Row: Serialize + Send + Sync + 'static;
    /// Create and update request body.
    type Payload: DeserializeOwned + Validate + Send + 'static;

    /// Route slug; the list view lives at `/{SLUG}_list/`.
    const SLUG: &'static str;
    /// Noun used in messages, e.g. "college 7 does not exist".
    const NOUN: &'static str;

    /// Accepted `sort_by` values. Anything else falls back to the entity's
    /// default order.
    fn sort_keys() -> &'static [&'static str];

    /// Human-readable label shown in the delete confirmation step.
    fn label(row: &Self::Row) -> String;

    async fn page(db: &DatabaseConnection, params: &ListParams) -> Result<Page<Self::Row>>;
    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Self::Row>>;
    async fn insert(db: &DatabaseConnection, payload: Self::Payload) -> Result<i32>;
    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload) -> Result<()>;
    /// Counts of rows in other tables that reference this record. Any
    /// non-zero count blocks deletion.
    async fn dependents(db: &DatabaseConnection, id: i32) -> Result<Vec<DependentCount>>;
    async fn delete(db: &DatabaseConnection, id: i32) -> Result<()>;
}

/// How many rows of one kind reference a record.
#[derive(Debug, Clone, Serialize)]
pub struct DependentCount {
    pub kind: &'static str,
    pub count: u64,
}

/// Body returned by the delete confirmation read.
#[derive(Debug, Serialize)]
pub struct DeletePreview {
    pub id: i32,
    pub label: String,
    pub dependents: Vec<DependentCount>,
}

/// 201 response with a Location header pointing back at the list view.
pub struct CreatedResponse<T: Serialize> {
    pub data: T,
    pub location: String,
}

impl<T: Serialize> IntoResponse for CreatedResponse<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(self.data)).into_response();
        match self.location.parse() {
            Ok(value) => {
                response.headers_mut().insert(header::LOCATION, value);
            }
            Err(_) => {
                tracing::warn!(location = %self.location, "Invalid Location header value");
            }
        }
        response
    }
}

/// Empty 204 response for completed deletes.
#[derive(Debug, Clone, Copy)]
pub struct NoContentResponse;

impl IntoResponse for NoContentResponse {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

// ============ Generic handlers ============

async fn list<R: Resource>(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<R::Row>>> {
    let page = R::page(&ctx.db, &params).await?;
    Ok(Json(page))
}

async fn create<R: Resource>(
    State(ctx): State<AppContext>,
    ValidatedJson(payload): ValidatedJson<R::Payload>,
) -> Result<CreatedResponse<R::Row>> {
    let id = R::insert(&ctx.db, payload).await?;
    let row = R::find(&ctx.db, id)
        .await?
        .ok_or_else(|| AppError::internal(format!("{} {} missing after insert", R::NOUN, id)))?;
    tracing::info!(resource = R::SLUG, id, "Record created");
    Ok(CreatedResponse {
        data: row,
        location: format!("/{}_list/", R::SLUG),
    })
}

async fn fetch<R: Resource>(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<R::Row>> {
    let row = require::<R>(&ctx.db, id).await?;
    Ok(Json(row))
}

async fn update<R: Resource>(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<R::Payload>,
) -> Result<Json<R::Row>> {
    R::update(&ctx.db, id, payload).await?;
    let row = require::<R>(&ctx.db, id).await?;
    tracing::info!(resource = R::SLUG, id, "Record updated");
    Ok(Json(row))
}

async fn delete_preview<R: Resource>(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<DeletePreview>> {
    let row = require::<R>(&ctx.db, id).await?;
    let dependents = R::dependents(&ctx.db, id).await?;
    Ok(Json(DeletePreview {
        id,
        label: R::label(&row),
        dependents,
    }))
}

async fn destroy<R: Resource>(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<NoContentResponse> {
    require::<R>(&ctx.db, id).await?;

    let blocking: Vec<String> = R::dependents(&ctx.db, id)
        .await?
        .into_iter()
        .filter(|d| d.count > 0)
        .map(|d| format!("{} {}", d.count, d.kind))
        .collect();
    if !blocking.is_empty() {
        return Err(AppError::conflict(format!(
            "cannot delete {} {}: referenced by {}",
            R::NOUN,
            id,
            blocking.join(", ")
        )));
    }

    R::delete(&ctx.db, id).await?;
    tracing::info!(resource = R::SLUG, id, "Record deleted");
    Ok(NoContentResponse)
}

async fn require<R: Resource>(db: &DatabaseConnection, id: i32) -> Result<R::Row> {
    R::find(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {} does not exist", R::NOUN, id)))
}

/// Referential check used by stores before inserting or updating a foreign
/// key. A dangling id is a validation error on the named field, not a 404.
pub(crate) async fn ensure_exists<E>(
    db: &DatabaseConnection,
    id: i32,
    field: &'static str,
    noun: &'static str,
) -> Result<()>
where
    E: EntityTrait,
    i32: Into<<E::PrimaryKey as PrimaryKeyTrait>::ValueType>,
{
    if E::find_by_id(id).one(db).await?.is_none() {
        return Err(AppError::validation(
            field,
            format!("{} {} does not exist", noun, id),
        ));
    }
    Ok(())
}

/// All routes for one entity.
pub fn routes<R: Resource>() -> Router<AppContext> {
    Router::new()
        .route(&format!("/{}_list/", R::SLUG), get(list::<R>))
        .route(
            &format!("/{}_list/add", R::SLUG),
            axum::routing::post(create::<R>),
        )
        .route(
            &format!("/{}_list/{{id}}", R::SLUG),
            get(fetch::<R>).put(update::<R>),
        )
        .route(
            &format!("/{}_list/{{id}}/delete", R::SLUG),
            get(delete_preview::<R>).post(destroy::<R>),
        )
}
