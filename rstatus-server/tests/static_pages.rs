use rstatus_core::api::routes;
use serde_json::Value;

#[path = "support/mod.rs"]
mod support;
use support::{TestOptions, build_test_app, contributor};

#[tokio::test]
async fn informational_pages_carry_their_titles() {
    let app = build_test_app(TestOptions::default());

    for (path, title) in [
        (routes::HOMEPAGE, "rstat.us"),
        (routes::OPEN_SOURCE, "open source"),
        (routes::CONTACT, "contact us"),
    ] {
        let response = app.server.get(path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["title"], title, "{path}");
    }
}

#[tokio::test]
async fn about_lists_contributors_case_insensitively() {
    let app = build_test_app(TestOptions {
        contributors: Some(vec![
            contributor("wilkie"),
            contributor("Carols10cents"),
            contributor("steveklabnik"),
            contributor("bjorn"),
        ]),
        ..Default::default()
    });

    let response = app.server.get(routes::ABOUT).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "about us");
    let logins: Vec<&str> = body["data"]["contributors"]
        .as_array()
        .expect("contributors array")
        .iter()
        .map(|c| c["login"].as_str().expect("login"))
        .collect();
    assert_eq!(logins, ["bjorn", "Carols10cents", "steveklabnik", "wilkie"]);
    assert_eq!(
        body["data"]["contributors"][0]["profile_url"],
        "https://github.com/bjorn"
    );
}

#[tokio::test]
async fn about_survives_an_unavailable_contributor_source() {
    let app = build_test_app(TestOptions {
        contributors: None,
        ..Default::default()
    });

    let response = app.server.get(routes::ABOUT).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["title"], "about us");
    assert!(body["data"].get("contributors").is_none());
}

#[tokio::test]
async fn unknown_routes_get_the_not_found_page() {
    let app = build_test_app(TestOptions::default());

    let response = app.server.get("/definitely/not/here").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "The page you were looking for doesn't exist."
    );
}
