//! Student listing and storage.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_exists, DependentCount, Resource};
use crate::entities::{org_member, program, student};
use crate::error::{AppError, Result};
use crate::listing::{contains_ci, paginate_selector, ListParams, Page};

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct StudentRow {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub program_id: i32,
    pub program_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentPayload {
    #[validate(length(min = 1, max = 255, message = "first name must be 1 to 255 characters"))]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "last name must be 1 to 255 characters"))]
    pub last_name: String,
    pub program_id: i32,
}

pub struct Students;

impl Students {
    fn select() -> sea_orm::Select<student::Entity> {
        student::Entity::find()
            .select_only()
            .columns([
                student::Column::Id,
                student::Column::FirstName,
                student::Column::MiddleName,
                student::Column::LastName,
                student::Column::ProgramId,
            ])
            .column_as(program::Column::Name, "program_name")
            .join(JoinType::InnerJoin, student::Relation::Program.def())
    }
}

#[async_trait]
impl Resource for Students {
    type Row = StudentRow;
    type Payload = StudentPayload;

    const SLUG: &'static str = "student";
    const NOUN: &'static str = "student";

    fn sort_keys() -> &'static [&'static str] {
        &["last_name", "first_name", "program_name"]
    }

    fn label(row: &Self::Row) -> String {
        format!("{}, {}", row.last_name, row.first_name)
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
                    ))
                    .add(contains_ci(
                        (student::Entity, student::Column::MiddleName),
                        term,
                    )),
            );
        }

        let select = match params.sort_by.as_deref() {
            Some("first_name") => select.order_by_asc(student::Column::FirstName),
            Some("program_name") => select.order_by_asc(program::Column::Name),
            // "last_name", absent or unknown
            _ => select.order_by_asc(student::Column::LastName),
        };
        let select = select.order_by_asc(student::Column::Id);

        paginate_selector(db, select.into_model::<StudentRow>(), params.page).await
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Self::Row>> {
        let row = Self::select()
            .filter(student::Column::Id.eq(id))
            .into_model::<StudentRow>()
            .one(db)
            .await?;
        Ok(row)
    }

    async fn insert(db: &DatabaseConnection, payload: Self::Payload) -> Result<i32> {
        ensure_exists::<program::Entity>(db, payload.program_id, "program_id", "program").await?;

        let now = Utc::now().fixed_offset();
        let active = student::ActiveModel {
            first_name: Set(payload.first_name),
            middle_name: Set(payload.middle_name),
            last_name: Set(payload.last_name),
            program_id: Set(payload.program_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = student::Entity::insert(active).exec(db).await?;

        tracing::debug!(id = inserted.last_insert_id, "Student inserted");
        Ok(inserted.last_insert_id)
    }

    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload) -> Result<()> {
        let existing = student::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("student {} does not exist", id)))?;
        ensure_exists::<program::Entity>(db, payload.program_id, "program_id", "program").await?;

        let mut active: student::ActiveModel = existing.into();
        active.first_name = Set(payload.first_name);
        active.middle_name = Set(payload.middle_name);
        active.last_name = Set(payload.last_name);
        active.program_id = Set(payload.program_id);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(db).await?;

        tracing::debug!(id, "Student updated");
        Ok(())
    }

    async fn dependents(db: &DatabaseConnection, id: i32) -> Result<Vec<DependentCount>> {
        let memberships = org_member::Entity::find()
            .filter(org_member::Column::StudentId.eq(id))
            .count(db)
            .await?;
        Ok(vec![DependentCount {
            kind: "memberships",
            count: memberships,
        }])
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
        student::Entity::delete_by_id(id).exec(db).await?;
        tracing::debug!(id, "Student deleted");
        Ok(())
    }
}
