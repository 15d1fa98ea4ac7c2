//! List endpoint behavior: fixed-size pagination, free-text filtering and
//! whitelisted sort keys.

use serde_json::{json, Value};
use studentorg::testing::{self, TestDb};
use studentorg::{router, AppContext};

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

async fn list(app: &axum::Router, path: &str, query: &[(&str, &str)]) -> Value {
    testing::get(app.clone(), path)
        .with_query(query)
        .execute()
        .await
        .assert_ok()
        .json()
        .await
}

fn names(page: &Value) -> Vec<&str> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}

fn last_names(page: &Value) -> Vec<&str> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["last_name"].as_str().unwrap())
        .collect()
}

/// One college with `count` organizations named "Org 01", "Org 02", ...
async fn seed_organizations(app: &axum::Router, count: usize) -> i64 {
    let college = create(app, "/college_list/add", json!({"name": "Central College"})).await;
    let college_id = college["id"].as_i64().unwrap();
    for n in 1..=count {
        create(
            app,
            "/organization_list/add",
            json!({
                "name": format!("Org {:02}", n),
                "college_id": college_id,
                "description": null,
            }),
        )
        .await;
    }
    college_id
}

#[tokio::test]
async fn test_list_is_paginated_in_fives() {
    let (_db, app) = setup().await;
    seed_organizations(&app, 12).await;

    let first = list(&app, "/organization_list/", &[]).await;
    assert_eq!(first["total"], 12);
    assert_eq!(first["page"], 1);
    assert_eq!(first["per_page"], 5);
    assert_eq!(first["total_pages"], 3);
    assert_eq!(first["has_next"], true);
    assert_eq!(first["has_prev"], false);
    assert_eq!(
        names(&first),
        vec!["Org 01", "Org 02", "Org 03", "Org 04", "Org 05"]
    );

    let last = list(&app, "/organization_list/", &[("page", "3")]).await;
    assert_eq!(names(&last), vec!["Org 11", "Org 12"]);
    assert_eq!(last["has_next"], false);
    assert_eq!(last["has_prev"], true);
}

#[tokio::test]
async fn test_out_of_range_pages_clamp() {
    let (_db, app) = setup().await;
    seed_organizations(&app, 12).await;

    let high = list(&app, "/organization_list/", &[("page", "99")]).await;
    assert_eq!(high["page"], 3);
    assert_eq!(names(&high), vec!["Org 11", "Org 12"]);

    let low = list(&app, "/organization_list/", &[("page", "-5")]).await;
    assert_eq!(low["page"], 1);
    assert_eq!(names(&low)[0], "Org 01");

    let zero = list(&app, "/organization_list/", &[("page", "0")]).await;
    assert_eq!(zero["page"], 1);
}

#[tokio::test]
async fn test_blank_filter_matches_everything() {
    let (_db, app) = setup().await;
    seed_organizations(&app, 6).await;

    let empty = list(&app, "/organization_list/", &[("q", "")]).await;
    assert_eq!(empty["total"], 6);

    let spaces = list(&app, "/organization_list/", &[("q", "   ")]).await;
    assert_eq!(spaces["total"], 6);
}

#[tokio::test]
async fn test_filter_is_case_insensitive_and_searches_description() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let college_id = college["id"].as_i64().unwrap();
    for (name, description) in [
        ("Chess Club", Some("Board games weekly")),
        ("Debate Society", None),
        ("Robotics Guild", Some("We build chess-playing robots")),
    ] {
        create(
            &app,
            "/organization_list/add",
            json!({"name": name, "college_id": college_id, "description": description}),
        )
        .await;
    }

    let hits = list(&app, "/organization_list/", &[("q", "CHESS")]).await;
    assert_eq!(hits["total"], 2);
    assert_eq!(names(&hits), vec!["Chess Club", "Robotics Guild"]);

    let society = list(&app, "/organization_list/", &[("q", "society")]).await;
    assert_eq!(names(&society), vec!["Debate Society"]);
}

#[tokio::test]
async fn test_filter_treats_like_metacharacters_literally() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let college_id = college["id"].as_i64().unwrap();
    for name in [
        "100% Attendance Club",
        "100 Strong",
        "snake_case Society",
        "snakeycase Society",
    ] {
        create(
            &app,
            "/organization_list/add",
            json!({"name": name, "college_id": college_id, "description": null}),
        )
        .await;
    }

    let percent = list(&app, "/organization_list/", &[("q", "100%")]).await;
    assert_eq!(names(&percent), vec!["100% Attendance Club"]);

    let underscore = list(&app, "/organization_list/", &[("q", "snake_case")]).await;
    assert_eq!(names(&underscore), vec!["snake_case Society"]);
}

#[tokio::test]
async fn test_organization_sort_keys() {
    let (_db, app) = setup().await;
    let zeta = create(&app, "/college_list/add", json!({"name": "Zeta College"})).await;
    let alpha = create(&app, "/college_list/add", json!({"name": "Alpha College"})).await;
    for (name, college) in [
        ("Beta Org", &zeta),
        ("Gamma Org", &alpha),
        ("Alpha Org", &zeta),
    ] {
        create(
            &app,
            "/organization_list/add",
            json!({"name": name, "college_id": college["id"], "description": null}),
        )
        .await;
    }

    // Default order groups by college name, then organization name
    let by_default = list(&app, "/organization_list/", &[]).await;
    assert_eq!(names(&by_default), vec!["Gamma Org", "Alpha Org", "Beta Org"]);

    let by_name = list(
        &app,
        "/organization_list/",
        &[("sort_by", "organization_name")],
    )
    .await;
    assert_eq!(names(&by_name), vec!["Alpha Org", "Beta Org", "Gamma Org"]);

    // college_name alone falls back to insertion order within a college
    let by_college = list(&app, "/organization_list/", &[("sort_by", "college_name")]).await;
    assert_eq!(names(&by_college), vec!["Gamma Org", "Beta Org", "Alpha Org"]);

    // Unknown keys silently use the default order
    let bogus = list(&app, "/organization_list/", &[("sort_by", "bogus")]).await;
    assert_eq!(names(&bogus), vec!["Gamma Org", "Alpha Org", "Beta Org"]);
}

#[tokio::test]
async fn test_student_sort_keys() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let math = create(
        &app,
        "/program_list/add",
        json!({"name": "Math", "college_id": college["id"]}),
    )
    .await;
    let zoology = create(
        &app,
        "/program_list/add",
        json!({"name": "Zoology", "college_id": college["id"]}),
    )
    .await;
    for (first, last, program) in [
        ("Charlie", "Adams", &math),
        ("Alice", "Baker", &zoology),
        ("Bob", "Clark", &math),
    ] {
        create(
            &app,
            "/student_list/add",
            json!({
                "first_name": first,
                "middle_name": null,
                "last_name": last,
                "program_id": program["id"],
            }),
        )
        .await;
    }

    let by_default = list(&app, "/student_list/", &[]).await;
    assert_eq!(last_names(&by_default), vec!["Adams", "Baker", "Clark"]);

    let by_first = list(&app, "/student_list/", &[("sort_by", "first_name")]).await;
    assert_eq!(last_names(&by_first), vec!["Baker", "Clark", "Adams"]);

    let by_program = list(&app, "/student_list/", &[("sort_by", "program_name")]).await;
    assert_eq!(last_names(&by_program), vec!["Adams", "Clark", "Baker"]);
}

#[tokio::test]
async fn test_filter_searches_student_middle_name() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let program = create(
        &app,
        "/program_list/add",
        json!({"name": "Math", "college_id": college["id"]}),
    )
    .await;
    for (first, middle, last) in [
        ("Maya", Some("Quill"), "Stone"),
        ("Liam", None, "Reyes"),
    ] {
        create(
            &app,
            "/student_list/add",
            json!({
                "first_name": first,
                "middle_name": middle,
                "last_name": last,
                "program_id": program["id"],
            }),
        )
        .await;
    }

    let hits = list(&app, "/student_list/", &[("q", "quill")]).await;
    assert_eq!(hits["total"], 1);
    assert_eq!(last_names(&hits), vec!["Stone"]);
}

#[tokio::test]
async fn test_program_filter_matches_college_name() {
    let (_db, app) = setup().await;
    let engineering = create(
        &app,
        "/college_list/add",
        json!({"name": "College of Engineering"}),
    )
    .await;
    let arts = create(&app, "/college_list/add", json!({"name": "College of Arts"})).await;
    for (name, college) in [
        ("Painting", &arts),
        ("Robotics", &engineering),
        ("Sculpture", &arts),
    ] {
        create(
            &app,
            "/program_list/add",
            json!({"name": name, "college_id": college["id"]}),
        )
        .await;
    }

    let by_college = list(&app, "/program_list/", &[("q", "engineering")]).await;
    assert_eq!(names(&by_college), vec!["Robotics"]);

    let arts_hits = list(&app, "/program_list/", &[("q", "arts")]).await;
    assert_eq!(arts_hits["total"], 2);
    assert_eq!(names(&arts_hits), vec!["Painting", "Sculpture"]);
}

#[tokio::test]
async fn test_membership_sort_keys() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let program = create(
        &app,
        "/program_list/add",
        json!({"name": "Math", "college_id": college["id"]}),
    )
    .await;
    let mut student_ids = Vec::new();
    for last in ["Young", "Xu", "Zhang"] {
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
        student_ids.push(student["id"].as_i64().unwrap());
    }
    let astronomy = create(
        &app,
        "/organization_list/add",
        json!({"name": "Astronomy Society", "college_id": college["id"], "description": null}),
    )
    .await;
    let book = create(
        &app,
        "/organization_list/add",
        json!({"name": "Book Circle", "college_id": college["id"], "description": null}),
    )
    .await;
    for (student_id, organization, date) in [
        (student_ids[0], &astronomy, "2026-09-30"),
        (student_ids[1], &book, "2026-05-01"),
        (student_ids[2], &book, "2026-01-15"),
    ] {
        create(
            &app,
            "/org_member_list/add",
            json!({
                "student_id": student_id,
                "organization_id": organization["id"],
                "date_joined": date,
            }),
        )
        .await;
    }

    fn member_last_names(page: &Value) -> Vec<&str> {
        page["items"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["student_last_name"].as_str().unwrap())
            .collect()
    }

    let by_default = list(&app, "/org_member_list/", &[]).await;
    assert_eq!(member_last_names(&by_default), vec!["Xu", "Young", "Zhang"]);

    let by_org = list(
        &app,
        "/org_member_list/",
        &[("sort_by", "organization_name")],
    )
    .await;
    assert_eq!(member_last_names(&by_org), vec!["Young", "Xu", "Zhang"]);

    let by_date = list(&app, "/org_member_list/", &[("sort_by", "date_joined")]).await;
    assert_eq!(member_last_names(&by_date), vec!["Zhang", "Xu", "Young"]);
}

#[tokio::test]
async fn test_filter_composes_with_pagination() {
    let (_db, app) = setup().await;
    let college = create(&app, "/college_list/add", json!({"name": "Central College"})).await;
    let college_id = college["id"].as_i64().unwrap();
    for n in 1..=7 {
        create(
            &app,
            "/organization_list/add",
            json!({
                "name": format!("Club {}", n),
                "college_id": college_id,
                "description": null,
            }),
        )
        .await;
    }
    for n in 1..=5 {
        create(
            &app,
            "/organization_list/add",
            json!({
                "name": format!("Guild {}", n),
                "college_id": college_id,
                "description": null,
            }),
        )
        .await;
    }

    let first = list(&app, "/organization_list/", &[("q", "club")]).await;
    assert_eq!(first["total"], 7);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["items"].as_array().unwrap().len(), 5);

    let second = list(
        &app,
        "/organization_list/",
        &[("q", "club"), ("page", "2")],
    )
    .await;
    assert_eq!(names(&second), vec!["Club 6", "Club 7"]);
}
