//! Academic program listing and storage.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ensure_exists, DependentCount, Resource};
use crate::entities::{college, program, student};
use crate::error::{AppError, Result};
use crate::listing::{contains_ci, paginate_selector, ListParams, Page};

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct ProgramRow {
    pub id: i32,
    pub name: String,
    pub college_id: i32,
    pub college_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProgramPayload {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
    pub college_id: i32,
}

pub struct Programs;

impl Programs {
    fn select() -> sea_orm::Select<program::Entity> {
        program::Entity::find()
            .select_only()
            .columns([
                program::Column::Id,
                program::Column::Name,
                program::Column::CollegeId,
            ])
            .column_as(college::Column::Name, "college_name")
            .join(JoinType::InnerJoin, program::Relation::College.def())
    }
}

#[async_trait]
impl Resource for Programs {
    type Row = ProgramRow;
    type Payload = ProgramPayload;

    const SLUG: &'static str = "program";
    const NOUN: &'static str = "program";

    fn sort_keys() -> &'static [&'static str] {
        &["program_name", "college_name"]
    }

    fn label(row: &Self::Row) -> String {
        row.name.clone()
    }

    async fn page(db: &DatabaseConnection, params: &ListParams) -> Result<Page<Self::Row>> {
        let mut select = Self::select();

        if let Some(term) = params.search_term() {
            select = select.filter(
                Condition::any()
                    .add(contains_ci((program::Entity, program::Column::Name), term))
                    .add(contains_ci((college::Entity, college::Column::Name), term)),
            );
        }

        let select = match params.sort_by.as_deref() {
            Some("college_name") => select.order_by_asc(college::Column::Name),
            // "program_name", absent or unknown
            _ => select.order_by_asc(program::Column::Name),
        };
        let select = select.order_by_asc(program::Column::Id);

        paginate_selector(db, select.into_model::<ProgramRow>(), params.page).await
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Self::Row>> {
        let row = Self::select()
            .filter(program::Column::Id.eq(id))
            .into_model::<ProgramRow>()
            .one(db)
            .await?;
        Ok(row)
    }

    async fn insert(db: &DatabaseConnection, payload: Self::Payload) -> Result<i32> {
        ensure_exists::<college::Entity>(db, payload.college_id, "college_id", "college").await?;

        let now = Utc::now().fixed_offset();
        let active = program::ActiveModel {
            name: Set(payload.name),
            college_id: Set(payload.college_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = program::Entity::insert(active).exec(db).await?;

        tracing::debug!(id = inserted.last_insert_id, "Program inserted");
        Ok(inserted.last_insert_id)
    }

    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload) -> Result<()> {
        let existing = program::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("program {} does not exist", id)))?;
        ensure_exists::<college::Entity>(db, payload.college_id, "college_id", "college").await?;

        let mut active: program::ActiveModel = existing.into();
        active.name = Set(payload.name);
        active.college_id = Set(payload.college_id);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(db).await?;

        tracing::debug!(id, "Program updated");
        Ok(())
    }

    async fn dependents(db: &DatabaseConnection, id: i32) -> Result<Vec<DependentCount>> {
        let students = student::Entity::find()
            .filter(student::Column::ProgramId.eq(id))
            .count(db)
            .await?;
        Ok(vec![DependentCount {
            kind: "students",
            count: students,
        }])
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
        program::Entity::delete_by_id(id).exec(db).await?;
        tracing::debug!(id, "Program deleted");
        Ok(())
    }
}
