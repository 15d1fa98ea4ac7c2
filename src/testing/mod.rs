//! Testing utilities: in-memory databases with the schema applied and
//! router-level request scenarios that run without a server.
//!
//! # Example
//!
//! ```rust,ignore
//! use studentorg::testing::{post, TestDb};
//! use studentorg::{router, AppContext};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_create_college() {
//!     let db = TestDb::new().await.unwrap();
//!     let app = router(AppContext::new(db.connection()));
//!
//!     post(app, "/college_list/add")
//!         .json_body(&json!({"name": "College of Engineering"}))
//!         .execute()
//!         .await
//!         .assert_created();
//! }
//! ```

mod database;
mod scenario;

pub use database::TestDb;
pub use scenario::{delete, get, post, put, Scenario, ScenarioAssert};
