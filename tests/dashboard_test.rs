//! Dashboard aggregation and the health endpoint.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};
use studentorg::testing::{self, TestDb};
use studentorg::{aggregate, router, AppContext};

async fn setup() -> (TestDb, axum::Router) {
    let db = TestDb::new().await.expect("test database");
    let app = router(AppContext::new(db.connection()));
    (db, app)
}

async fn create(app: &axum::Router, path: &str, body: Value) -> Value {
    testing::post(app.clone(), path)
        .json_body(&body)
        .execute()
        .await
        .assert_created()
        .json()
        .await
}

fn pinned(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[tokio::test]
async fn test_dashboard_starts_at_zero() {
    let (_db, app) = setup().await;

    let stats: Value = testing::get(app.clone(), "/")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(stats["total_students"], 0);
    assert_eq!(stats["total_organizations"], 0);
    assert_eq!(stats["total_colleges"], 0);
    assert_eq!(stats["total_programs"], 0);
    assert_eq!(stats["total_memberships"], 0);
    assert_eq!(stats["students_joined_this_year"], 0);
}

#[tokio::test]
async fn test_dashboard_counts_each_entity() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let college_id = college["id"].as_i64().unwrap();

    let mut program_ids = Vec::new();
    for name in ["Math", "Physics"] {
        let program = create(
            &app,
            "/program_list/add",
            json!({"name": name, "college_id": college_id}),
        )
        .await;
        program_ids.push(program["id"].as_i64().unwrap());
    }

    let mut student_ids = Vec::new();
    for last in ["Adams", "Baker", "Clark"] {
        let student = create(
            &app,
            "/student_list/add",
            json!({
                "first_name": "Sam",
                "middle_name": null,
                "last_name": last,
                "program_id": program_ids[0],
            }),
        )
        .await;
        student_ids.push(student["id"].as_i64().unwrap());
    }

    let mut organization_ids = Vec::new();
    for name in ["Chess Club", "Debate Society"] {
        let organization = create(
            &app,
            "/organization_list/add",
            json!({"name": name, "college_id": college_id, "description": null}),
        )
        .await;
        organization_ids.push(organization["id"].as_i64().unwrap());
    }

    // The handler aggregates as of today, so join dates use the current year
    let year = Utc::now().year();
    let date = |month: u32, day: u32| format!("{:04}-{:02}-{:02}", year, month, day);
    for (student, organization, joined) in [
        (student_ids[0], organization_ids[0], date(1, 15)),
        (student_ids[0], organization_ids[1], date(2, 1)),
        (student_ids[1], organization_ids[0], date(3, 10)),
        (student_ids[2], organization_ids[1], date(4, 20)),
    ] {
        create(
            &app,
            "/org_member_list/add",
            json!({
                "student_id": student,
                "organization_id": organization,
                "date_joined": joined,
            }),
        )
        .await;
    }

    let stats: Value = testing::get(app.clone(), "/")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(stats["total_colleges"], 1);
    assert_eq!(stats["total_programs"], 2);
    assert_eq!(stats["total_students"], 3);
    assert_eq!(stats["total_organizations"], 2);
    assert_eq!(stats["total_memberships"], 4);
    assert_eq!(stats["students_joined_this_year"], 3);
}

#[tokio::test]
async fn test_repeat_joiners_count_once() {
    let (db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let program = create(
        &app,
        "/program_list/add",
        json!({"name": "Math", "college_id": college["id"]}),
    )
    .await;
    let student = create(
        &app,
        "/student_list/add",
        json!({
            "first_name": "Ada",
            "middle_name": null,
            "last_name": "Lovelace",
            "program_id": program["id"],
        }),
    )
    .await;
    for name in ["Chess Club", "Debate Society"] {
        let organization = create(
            &app,
            "/organization_list/add",
            json!({"name": name, "college_id": college["id"], "description": null}),
        )
        .await;
        create(
            &app,
            "/org_member_list/add",
            json!({
                "student_id": student["id"],
                "organization_id": organization["id"],
                "date_joined": "2026-02-01",
            }),
        )
        .await;
    }

    let stats = aggregate(&db.connection, pinned(2026, 7, 1)).await.unwrap();
    assert_eq!(stats.total_memberships, 2);
    assert_eq!(stats.students_joined_this_year, 1);
}

#[tokio::test]
async fn test_year_window_is_calendar_bounded() {
    let (db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let program = create(
        &app,
        "/program_list/add",
        json!({"name": "Math", "college_id": college["id"]}),
    )
    .await;
    let organization = create(
        &app,
        "/organization_list/add",
        json!({"name": "Chess Club", "college_id": college["id"], "description": null}),
    )
    .await;

    for (last, joined) in [
        ("Adams", "2025-12-31"),
        ("Baker", "2026-01-01"),
        ("Clark", "2026-12-31"),
        ("Diaz", "2027-01-01"),
    ] {
        let student = create(
            &app,
            "/student_list/add",
            json!({
                "first_name": "Sam",
                "middle_name": null,
                "last_name": last,
                "program_id": program["id"],
            }),
        )
        .await;
        create(
            &app,
            "/org_member_list/add",
            json!({
                "student_id": student["id"],
                "organization_id": organization["id"],
                "date_joined": joined,
            }),
        )
        .await;
    }

    let stats = aggregate(&db.connection, pinned(2026, 6, 15)).await.unwrap();
    assert_eq!(stats.total_memberships, 4);
    // Dec 31 of the previous year and Jan 1 of the next are both outside
    assert_eq!(stats.students_joined_this_year, 2);

    let prior = aggregate(&db.connection, pinned(2025, 6, 15)).await.unwrap();
    assert_eq!(prior.students_joined_this_year, 1);
}

#[tokio::test]
async fn test_dashboard_sees_raw_seeded_rows() {
    let (db, app) = setup().await;
    db.seed(&[
        "INSERT INTO colleges (name) VALUES ('Seeded College')",
        "INSERT INTO programs (name, college_id) VALUES ('Seeded Program', 1)",
    ])
    .await
    .unwrap();

    let stats: Value = testing::get(app.clone(), "/")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(stats["total_colleges"], 1);
    assert_eq!(stats["total_programs"], 1);
}

#[tokio::test]
async fn test_health_reports_database_component() {
    let (_db, app) = setup().await;

    let body: Value = testing::get(app.clone(), "/health")
        .execute()
        .await
        .assert_ok()
        .json()
        .await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"][0]["name"], "database");
    assert_eq!(body["checks"][0]["status"], "healthy");
}
