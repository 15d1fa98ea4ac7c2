//! SeaORM entities for the five managed tables.

pub mod prelude;

pub mod college;
pub mod org_member;
pub mod organization;
pub mod program;
pub mod student;
