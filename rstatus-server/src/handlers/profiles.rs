use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use rstatus_core::api::{
    ApiResponse, EditableProfile, ProfileSaved, ProfileView,
    routes::{self, users},
};
use rstatus_core::application::{ProfileLookup, ProfileServiceError};
use rstatus_core::domain::profile::ProfileChangeRequest;
use tracing::debug;

use super::payload::ProfileChangePayload;
use crate::auth::Viewer;
use crate::infra::{app_state::AppState, errors::AppResult};

pub const PROFILE_SAVED_MESSAGE: &str = "Profile saved!";

/// Show a profile. Any other casing of the username redirects to the stored
/// spelling.
pub async fn show_profile_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let account = match state.profiles.resolve(&username).await? {
        ProfileLookup::Found(account) => account,
        ProfileLookup::Redirect { canonical } => {
            debug!(requested = %username, %canonical, "redirecting to canonical profile");
            return Ok(Redirect::permanent(&users::profile_path(&canonical)).into_response());
        }
    };

    let view = ProfileView::from_account(&account, viewer.owns(&account));
    Ok(Json(ApiResponse::success(view)).into_response())
}

/// Edit form data. Only the owner sees it: anonymous visitors go to the
/// homepage and other accounts go back to the public profile.
pub async fn edit_profile_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let account = match state.profiles.resolve(&username).await? {
        ProfileLookup::Found(account) => account,
        ProfileLookup::Redirect { canonical } => {
            return Ok(Redirect::permanent(&users::edit_path(&canonical)).into_response());
        }
    };

    if viewer.account().is_none() {
        return Ok(Redirect::to(routes::HOMEPAGE).into_response());
    }
    if !viewer.owns(&account) {
        return Ok(Redirect::to(&users::profile_path(&account.username)).into_response());
    }

    Ok(Json(ApiResponse::success(EditableProfile::from(&account))).into_response())
}

/// Save a profile edit. The body is only decoded once the account exists
/// under this exact spelling and belongs to the viewer.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(username): Path<String>,
    payload: ProfileChangePayload,
) -> AppResult<Response> {
    let account = match state.profiles.authorize(&username, viewer.account()).await {
        Ok(account) => account,
        Err(ProfileServiceError::NonCanonical { canonical }) => {
            return Ok(Redirect::permanent(&users::profile_path(&canonical)).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let request = ProfileChangeRequest::from_json(&payload.into_json()?)?;
    let outcome = state.profiles.save(&account, &request).await?;

    debug!(
        username = %outcome.account.username,
        verification_email_sent = outcome.verification_email_sent,
        "profile saved"
    );

    let saved = ProfileSaved {
        profile: ProfileView::from_account(&outcome.account, true),
        verification_email_sent: outcome.verification_email_sent,
    };

    Ok(Json(
        ApiResponse::success(saved).with_message(PROFILE_SAVED_MESSAGE.to_string()),
    )
    .into_response())
}
