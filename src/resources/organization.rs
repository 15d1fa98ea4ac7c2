//! Student organization listing and storage.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_exists, DependentCount, Resource};
use crate::entities::{college, org_member, organization};
use crate::error::{AppError, Result};
use crate::listing::{contains_ci, paginate_selector, ListParams, Page};

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct OrganizationRow {
    pub id: i32,
    pub name: String,
    pub college_id: i32,
    pub college_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrganizationPayload {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    pub college_id: i32,
    pub description: Option<String>,
}

pub struct Organizations;

impl Organizations {
    fn select() -> sea_orm::Select<organization::Entity> {
        organization::Entity::find()
            .select_only()
            .columns([
                organization::Column::Id,
                organization::Column::Name,
                organization::Column::CollegeId,
                organization::Column::Description,
            ])
            .column_as(college::Column::Name, "college_name")
            .join(JoinType::InnerJoin, organization::Relation::College.def())
    }
}

#[async_trait]
impl Resource for Organizations {
    type Row = OrganizationRow;
    type Payload = OrganizationPayload;

    const SLUG: &'static str = "organization";
    const NOUN: &'static str = "organization";

    fn sort_keys() -> &'static [&'static str] {
        &["organization_name", "college_name"]
    }

    fn label(row: &Self::Row) -> String {
        row.name.clone()
    }

    async fn page(db: &DatabaseConnection, params: &ListParams) -> Result<Page<Self::Row>> {
        let mut select = Self::select();

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(
                        (organization::Entity, organization::Column::Name),
                        term,
                    ))
                    .add(contains_ci(
                        (organization::Entity, organization::Column::Description),
                        term,
                    )),
            );
        }

        let select = match params.sort_by.as_deref() {
            Some("organization_name") => select.order_by_asc(organization::Column::Name),
            Some("college_name") => select.order_by_asc(college::Column::Name),
            // absent or unknown: group by college, then name within it
            _ => select
                .order_by_asc(college::Column::Name)
                .order_by_asc(organization::Column::Name),
        };
        let select = select.order_by_asc(organization::Column::Id);

        paginate_selector(db, select.into_model::<OrganizationRow>(), params.page).await
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Self::Row>> {
        let row = Self::select()
            .filter(organization::Column::Id.eq(id))
            .into_model::<OrganizationRow>()
            .one(db)
            .await?;
        Ok(row)
    }

    async fn insert(db: &DatabaseConnection, payload: Self::Payload) -> Result<i32> {
        ensure_exists::<college::Entity>(db, payload.college_id, "college_id", "college").await?;

        let now = Utc::now().fixed_offset();
        let active = organization::ActiveModel {
            name: Set(payload.name),
            college_id: Set(payload.college_id),
            description: Set(payload.description),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = organization::Entity::insert(active).exec(db).await?;

        tracing::debug!(id = inserted.last_insert_id, "Organization inserted");
        Ok(inserted.last_insert_id)
    }

    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload) -> Result<()> {
        let existing = organization::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("organization {} does not exist", id)))?;
        ensure_exists::<college::Entity>(db, payload.college_id, "college_id", "college").await?;

        let mut active: organization::ActiveModel = existing.into();
        active.name = Set(payload.name);
        active.college_id = Set(payload.college_id);
        active.description = Set(payload.description);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(db).await?;

        tracing::debug!(id, "Organization updated");
        Ok(())
    }

    async fn dependents(db: &DatabaseConnection, id: i32) -> Result<Vec<DependentCount>> {
        let memberships = org_member::Entity::find()
            .filter(org_member::Column::OrganizationId.eq(id))
            .count(db)
            .await?;
        Ok(vec![DependentCount {
            kind: "memberships",
            count: memberships,
        }])
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
        organization::Entity::delete_by_id(id).exec(db).await?;
        tracing::debug!(id, "Organization deleted");
        Ok(())
    }
}
