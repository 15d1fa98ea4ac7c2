//! College listing and storage.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DependentCount, Resource};
use crate::entities::{college, organization, program};
use crate::error::{AppError, Result};
use crate::listing::{contains_ci, paginate_selector, ListParams, Page};

#[derive(Debug, Clone, Serialize, Deserialize, FromQueryResult)]
pub struct CollegeRow {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CollegePayload {
    #[validate(length(min = 1, max = 255, message = "name must be 1 to 255 characters"))]
    pub name: String,
}

pub struct Colleges;

impl Colleges {
    fn select() -> sea_orm::Select<college::Entity> {
        college::Entity::find()
            .select_only()
            .columns([college::Column::Id, college::Column::Name])
    }

    /// College names are unique; report a duplicate as a field error rather
    /// than letting the constraint violation surface as a 500.
    async fn ensure_name_free(
        db: &DatabaseConnection,
        name: &str,
        exclude: Option<i32>,
    ) -> Result<()> {
        let mut select = college::Entity::find().filter(college::Column::Name.eq(name));
        if let Some(id) = exclude {
            select = select.filter(college::Column::Id.ne(id));
        }
        if select.count(db).await? > 0 {
            return Err(AppError::validation(
                "name",
                format!("college {:?} already exists", name),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for Colleges {
    type Row = CollegeRow;
    type Payload = CollegePayload;

    const SLUG: &'static str = "college";
    const NOUN: &'static str = "college";

    fn sort_keys() -> &'static [&'static str] {
        &["name"]
    }

    fn label(row: &Self::Row) -> String {
        row.name.clone()
    }

    async fn page(db: &DatabaseConnection, params: &ListParams) -> Result<Page<Self::Row>> {
        let mut select = Self::select();

        if let Some(term) = params.search_term() {
            select = select.filter(contains_ci(
                (college::Entity, college::Column::Name),
                term,
            ));
        }

        // "name" is the only whitelisted key and matches the default order,
        // so any other sort_by value falls back to the same thing
        let select = select
            .order_by_asc(college::Column::Name)
            .order_by_asc(college::Column::Id);

        paginate_selector(db, select.into_model::<CollegeRow>(), params.page).await
    }

    async fn find(db: &DatabaseConnection, id: i32) -> Result<Option<Self::Row>> {
        let row = Self::select()
            .filter(college::Column::Id.eq(id))
            .into_model::<CollegeRow>()
            .one(db)
            .await?;
        Ok(row)
    }

    async fn insert(db: &DatabaseConnection, payload: Self::Payload) -> Result<i32> {
        Self::ensure_name_free(db, &payload.name, None).await?;

        let now = Utc::now().fixed_offset();
        let active = college::ActiveModel {
            name: Set(payload.name),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let inserted = college::Entity::insert(active).exec(db).await?;

        tracing::debug!(id = inserted.last_insert_id, "College inserted");
        Ok(inserted.last_insert_id)
    }

    async fn update(db: &DatabaseConnection, id: i32, payload: Self::Payload) -> Result<()> {
        let existing = college::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("college {} does not exist", id)))?;
        Self::ensure_name_free(db, &payload.name, Some(id)).await?;

        let mut active: college::ActiveModel = existing.into();
        active.name = Set(payload.name);
        active.updated_at = Set(Utc::now().fixed_offset());
        active.update(db).await?;

        tracing::debug!(id, "College updated");
        Ok(())
    }

    async fn dependents(db: &DatabaseConnection, id: i32) -> Result<Vec<DependentCount>> {
        let programs = program::Entity::find()
            .filter(program::Column::CollegeId.eq(id))
            .count(db)
            .await?;
        let organizations = organization::Entity::find()
            .filter(organization::Column::CollegeId.eq(id))
            .count(db)
            .await?;
        Ok(vec![
            DependentCount {
                kind: "programs",
                count: programs,
            },
            DependentCount {
                kind: "organizations",
                count: organizations,
            },
        ])
    }

    async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
        college::Entity::delete_by_id(id).exec(db).await?;
        tracing::debug!(id, "College deleted");
        Ok(())
    }
}
