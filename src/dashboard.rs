//! Aggregate counts for the home dashboard.

use axum::extract::State;
use axum::Json;
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::app::AppContext;
use crate::entities::org_member;
use crate::entities::prelude::{College, OrgMember, Organization, Program, Student};
use crate::error::{AppError, Result};

/// Totals for every entity, plus the distinct count of students who joined
/// at least one organization during the current calendar year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_students: u64,
    pub total_organizations: u64,
    pub total_colleges: u64,
    pub total_programs: u64,
    pub total_memberships: u64,
    pub students_joined_this_year: u64,
}

/// Recompute all dashboard counts as of the given date.
///
/// The year window runs from January 1 through December 31 of `as_of`'s
/// year. A student with several memberships in that window counts once.
pub async fn aggregate(db: &DatabaseConnection, as_of: NaiveDate) -> Result<DashboardStats> {
    let total_colleges = College::find().count(db).await?;
    let total_programs = Program::find().count(db).await?;
    let total_students = Student::find().count(db).await?;
    let total_organizations = Organization::find().count(db).await?;
    let total_memberships = OrgMember::find().count(db).await?;

    let year = as_of.year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| AppError::internal(format!("invalid year {}", year)))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| AppError::internal(format!("invalid year {}", year)))?;

    let students_joined_this_year = OrgMember::find()
        .select_only()
        .column(org_member::Column::StudentId)
        .distinct()
        .filter(org_member::Column::DateJoined.between(start, end))
        .into_tuple::<i32>()
        .count(db)
        .await?;

    Ok(DashboardStats {
        total_students,
        total_organizations,
        total_colleges,
        total_programs,
        total_memberships,
        students_joined_this_year,
    })
}

pub async fn dashboard_handler(State(ctx): State<AppContext>) -> Result<Json<DashboardStats>> {
    let stats = aggregate(&ctx.db, Utc::now().date_naive()).await?;
    Ok(Json(stats))
}
