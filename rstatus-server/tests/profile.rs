use axum::http::StatusCode;
use rstatus_core::api::routes::{self, users};
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{PASSWORD, SentMail, TestOptions, build_test_app};

fn location(response: &axum_test::TestResponse) -> String {
    response
        .header("location")
        .to_str()
        .expect("ascii location")
        .to_string()
}

#[tokio::test]
async fn redirects_to_the_username_with_the_right_case() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("LADY_GAGA", None).await;

    let response = app.server.get(&users::profile_path("lady_gaga")).await;

    response.assert_status(StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/users/LADY_GAGA");
}

#[tokio::test]
async fn shows_profiles_when_username_contains_a_dot() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("foo.bar", None).await;

    let response = app.server.get(&users::profile_path("foo.bar")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["username"], "foo.bar");
    assert_eq!(body["data"]["editable"], false);
}

#[tokio::test]
async fn unknown_user_is_a_404_with_the_fixed_message() {
    let app = build_test_app(TestOptions::default());

    for path in [
        users::profile_path("nonexistent"),
        users::edit_path("nonexistent"),
        users::profile_path("not..valid!"),
    ] {
        let response = app.server.get(&path).await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(
            body["error"]["message"],
            "The page you were looking for doesn't exist."
        );
    }

    let response = app
        .server
        .post(&users::profile_path("nonexistent"))
        .json(&json!({ "name": "x" }))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn owner_sees_an_editable_profile() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("steve", None).await;
    let auth = app.log_in_as("steve").await;

    let response = app
        .server
        .get(&users::profile_path(&account.username))
        .add_header("Authorization", auth)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["editable"], true);
}

#[tokio::test]
async fn other_viewers_do_not_get_an_edit_link() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("steve", None).await;
    app.seed_account("mark", None).await;
    let auth = app.log_in_as("mark").await;

    let response = app
        .server
        .get(&users::profile_path("steve"))
        .add_header("Authorization", auth)
        .await;

    let body: Value = response.json();
    assert_eq!(body["data"]["editable"], false);
}

#[tokio::test]
async fn edit_page_is_only_for_the_owner() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("steve", Some("steve@apple.com")).await;
    app.seed_account("mark", None).await;

    let anonymous = app.server.get(&users::edit_path("steve")).await;
    anonymous.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&anonymous), routes::HOMEPAGE);

    let other = app
        .server
        .get(&users::edit_path("steve"))
        .add_header("Authorization", app.log_in_as("mark").await)
        .await;
    other.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&other), "/users/steve");

    let owner = app
        .server
        .get(&users::edit_path("steve"))
        .add_header("Authorization", app.log_in_as("steve").await)
        .await;
    owner.assert_status_ok();
    let body: Value = owner.json();
    assert_eq!(body["data"]["email"], "steve@apple.com");
    assert_eq!(body["data"]["email_confirmed"], true);
}

#[tokio::test]
async fn edit_page_canonicalizes_case() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("Steve", None).await;

    let response = app.server.get(&users::edit_path("STEVE")).await;

    response.assert_status(StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/users/Steve/edit");
}

#[tokio::test]
async fn updating_profile_fields() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("steve", Some("steve@apple.com")).await;
    let auth = app.log_in_as("steve").await;

    let response = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", auth)
        .json(&json!({
            "name": "Steve Jobs",
            "website": "http://apple.com",
            "bio": "To be or not to be",
            "email": "steve@apple.com"
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Profile saved!");
    assert_eq!(body["data"]["verification_email_sent"], false);
    assert_eq!(body["data"]["profile"]["name"], "Steve Jobs");

    let stored = app.stored(&account).await;
    assert_eq!(stored.name, "Steve Jobs");
    assert_eq!(stored.website.as_deref(), Some("http://apple.com"));
    assert_eq!(stored.bio.as_deref(), Some("To be or not to be"));
    assert!(stored.email_confirmed);
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn changing_email_sends_one_verification_email() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("foo.bar", Some("old@x.com")).await;
    let auth = app.log_in_as("foo.bar").await;

    let response = app
        .server
        .post(&users::profile_path("foo.bar"))
        .add_header("Authorization", auth)
        .json(&json!({ "email": "new_email@new_email.com" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["verification_email_sent"], true);
    assert_eq!(
        app.mailer.sent().await,
        vec![SentMail {
            username: "foo.bar".into(),
            to: "new_email@new_email.com".into(),
        }]
    );

    let stored = app.stored(&account).await;
    assert_eq!(stored.email.as_deref(), Some("new_email@new_email.com"));
    assert!(!stored.email_confirmed);
}

#[tokio::test]
async fn no_verification_when_confirmation_is_disabled() {
    let app = build_test_app(TestOptions {
        confirmation_enabled: false,
        ..Default::default()
    });
    let account = app.seed_account("foo.bar", Some("old@x.com")).await;
    let auth = app.log_in_as("foo.bar").await;

    let response = app
        .server
        .post(&users::profile_path("foo.bar"))
        .add_header("Authorization", auth)
        .json(&json!({ "email": "new@x.com" }))
        .await;

    response.assert_status_ok();
    assert!(app.mailer.sent().await.is_empty());
    assert!(app.stored(&account).await.email_confirmed);
}

#[tokio::test]
async fn updating_password_with_matching_confirmation() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("alice", None).await;
    let auth = app.log_in_as("alice").await;

    let response = app
        .server
        .post(&users::profile_path("alice"))
        .add_header("Authorization", auth)
        .json(&json!({
            "password": "new_password",
            "password_confirm": "new_password"
        }))
        .await;

    response.assert_status_ok();
    let stored = app.stored(&account).await;
    assert!(app.crypto.verify_password("new_password", &stored.password_hash).unwrap());
    assert!(!app.crypto.verify_password(PASSWORD, &stored.password_hash).unwrap());
}

#[tokio::test]
async fn mismatched_passwords_change_nothing() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("alice", Some("old@x.com")).await;
    let auth = app.log_in_as("alice").await;

    let response = app
        .server
        .post(&users::profile_path("alice"))
        .add_header("Authorization", auth)
        .json(&json!({
            "password": "new_password",
            "password_confirm": "bunk",
            "email": "new@x.com",
            "name": "Changed"
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "Profile could not be saved: Passwords must match"
    );
    assert_eq!(app.stored(&account).await, account);
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn form_bodies_are_accepted() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("steve", None).await;
    let auth = app.log_in_as("steve").await;

    let response = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", auth)
        .form(&[
            ("name", "Steve Jobs"),
            ("password", ""),
            ("password_confirm", ""),
        ])
        .await;

    response.assert_status_ok();
    let stored = app.stored(&account).await;
    assert_eq!(stored.name, "Steve Jobs");
    assert_eq!(stored.password_hash, account.password_hash);
}

#[tokio::test]
async fn saving_requires_the_owner() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("steve", None).await;
    app.seed_account("mark", None).await;
    let body = json!({ "name": "Hijacked" });

    let anonymous = app
        .server
        .post(&users::profile_path("steve"))
        .json(&body)
        .await;
    anonymous.assert_status_unauthorized();

    let other = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", app.log_in_as("mark").await)
        .json(&body)
        .await;
    other.assert_status_forbidden();

    let garbage_token = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", "Bearer not-a-session")
        .json(&body)
        .await;
    garbage_token.assert_status_unauthorized();

    assert_eq!(app.stored(&account).await.name, "Some User");
}

#[tokio::test]
async fn saving_against_other_case_redirects() {
    let app = build_test_app(TestOptions::default());
    let account = app.seed_account("Steve", None).await;
    let auth = app.log_in_as("Steve").await;

    let response = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", auth)
        .json(&json!({ "name": "Steve Jobs" }))
        .await;

    response.assert_status(StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/users/Steve");
    assert_eq!(app.stored(&account).await.name, "Some User");
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("steve", None).await;
    let auth = app.log_in_as("steve").await;

    let response = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", auth)
        .json(&json!({ "website": 42 }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn undecodable_bodies_do_not_mask_missing_accounts() {
    let app = build_test_app(TestOptions::default());

    let text = app
        .server
        .post(&users::profile_path("nonexistent"))
        .text("name=x")
        .await;
    text.assert_status_not_found();

    let broken_json = app
        .server
        .post(&users::profile_path("nonexistent"))
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    broken_json.assert_status_not_found();
}

#[tokio::test]
async fn undecodable_bodies_do_not_mask_the_login_check() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("Steve", None).await;

    let anonymous = app
        .server
        .post(&users::profile_path("Steve"))
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    anonymous.assert_status_unauthorized();

    let other_case = app
        .server
        .post(&users::profile_path("steve"))
        .text("name=x")
        .await;
    other_case.assert_status(StatusCode::PERMANENT_REDIRECT);

    let owner = app
        .server
        .post(&users::profile_path("Steve"))
        .add_header("Authorization", app.log_in_as("Steve").await)
        .bytes("{not json".into())
        .content_type("application/json")
        .await;
    owner.assert_status_bad_request();
}

#[tokio::test]
async fn revoked_sessions_can_no_longer_save() {
    let app = build_test_app(TestOptions::default());
    app.seed_account("steve", None).await;
    let issued = app.state.sessions.issue("steve").await.expect("issue");

    assert!(app.state.sessions.revoke(&issued.token).await.expect("revoke"));

    let response = app
        .server
        .post(&users::profile_path("steve"))
        .add_header("Authorization", support::bearer(&issued.token))
        .json(&json!({ "name": "Steve Jobs" }))
        .await;
    response.assert_status_unauthorized();
}
