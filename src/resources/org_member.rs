//! Organization membership listing and storage.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_exists, DependentCount, Resource};
use crate::entities::{org_member, organization, student};
use crate::error::{AppError, Result};
use crate::listing::{contains_ci, paginate_selector, ListParams, Page};

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct OrgMemberRow {
    pub id: i32,
    pub student_id: i32,
    pub student_first_name: String,
    pub student_last_name: String,
    pub organization_id: i32,
    pub organization_name: String,
    pub date_joined: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrgMemberPayload {
    pub student_id: i32,
    pub organization_id: i32,
    pub date_joined: NaiveDate,
}

pub struct OrgMembers;

impl OrgMembers {
    fn select() -> sea_orm::Select<org_member::Entity> {
        org_member::Entity::find()
            .select_only()
            .columns([
                org_member::Column::Id,
                org_member::Column::StudentId,
                org_member::Column::OrganizationId,
                org_member::Column::DateJoined,
            ])
            .column_as(student::Column::FirstName, "student_first_name")
            .column_as(student::Column::LastName, "student_last_name")
            .column_as(organization::Column::Name, "organization_name")
            .join(JoinType::InnerJoin, org_member::Relation::Student.def())
            .join(JoinType::InnerJoin, org_member::Relation::Organization.def())
    }
}

#[async_trait]
impl Resource for OrgMembers {
    type Row = OrgMemberRow;
    type Payload = OrgMemberPayload;

    const SLUG: &'static str = "org_member";
    const NOUN: &'static str = "membership";

    fn sort_keys() -> &'static [&'static str] {
        &["student_last_name", "organization_name", "date_joined"]
    }

    fn label(row: &Self::Row) -> String {
        format!(
            "{} {} in {}",
            row.student_first_name, row.student_last_name, row.organization_name
        )
    }

    async fn page(db: &DatabaseConnection, params: &ListParams) -> Result<Page<Self::Row>> {
        let mut select = Self::select();

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains_ci(
                        (student::Entity, student::Column::LastName),
                        term,
                    ))
                    .add(contains_ci(
                        (student::Entity, student::Column::FirstName),
                        term,
                    )),
            );
        }

        let select = match params.sort_by.as_deref() {
            Some("organization_name") => select.order_by_asc(organization::Column::Name),
            Some("date_joined") => select.order_by_asc(org_member::Column::DateJoined),
            // "student_last_name", absent or unknown
            _ => select.order_by_asc(student::Column::LastName),
        };
        let select = select.order_by_asc(org_member::Column::Id);

        paginate_selector(db, select.into_model::<OrgMemberRow>(), params.page).await
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Self::Row>> {
        let row = Self::select()
            .filter(org_member::Column::Id.eq(id))
            .into_model::<OrgMemberRow>()
            .one(db)
            .await?;
        Ok(row)
    }

    async fn insert(db: &DatabaseConnection, payload: Self::Payload) -> Result<i32> {
        ensure_exists::<student::Entity>(db, payload.student_id, "student_id", "student").await?;
        ensure_exists::<organization::Entity>(
            db,
            payload.organization_id,
            "organization_id",
            "organization",
        )
        .await?;

        let now = Utc::now().fixed_offset();
        let active = org_member::ActiveModel {
            student_id: Set(payload.student_id),
            organization_id: Set(payload.organization_id),
            date_joined: Set(payload.date_joined),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = org_member::Entity::insert(active).exec(db).await?;

        tracing::debug!(id = inserted.last_insert_id, "Membership inserted");
        Ok(inserted.last_insert_id)
    }

    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload) -> Result<()> {
        let existing = org_member::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("membership {} does not exist", id)))?;
        ensure_exists::<student::Entity>(db, payload.student_id, "student_id", "student").await?;
        ensure_exists::<organization::Entity>(
            db,
            payload.organization_id,
            "organization_id",
            "organization",
        )
        .await?;

        let mut active: org_member::ActiveModel = existing.into();
        active.student_id = Set(payload.student_id);
        active.organization_id = Set(payload.organization_id);
        active.date_joined = Set(payload.date_joined);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(db).await?;

        tracing::debug!(id, "Membership updated");
        Ok(())
    }

    async fn dependents(_db: &DatabaseConnection, _id: i32) -> Result<Vec<DependentCount>> {
        // nothing references a membership row
        Ok(Vec::new())
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
        org_member::Entity::delete_by_id(id).exec(db).await?;
        tracing::debug!(id, "Membership deleted");
        Ok(())
    }
}
