use axum::{Json, extract::State};
use rstatus_core::api::{ApiResponse, ContributorView, StaticPage};
use rstatus_core::domain::contributors::sort_contributors;
use tracing::warn;

use crate::infra::app_state::AppState;

pub const HOMEPAGE_TITLE: &str = "rstat.us";
pub const ABOUT_TITLE: &str = "about us";
pub const OPEN_SOURCE_TITLE: &str = "open source";
pub const CONTACT_TITLE: &str = "contact us";

pub async fn homepage_handler() -> Json<ApiResponse<StaticPage>> {
    Json(ApiResponse::success(StaticPage::titled(HOMEPAGE_TITLE)))
}

/// About page with the project's contributors. An unreachable contributor
/// source leaves the list empty rather than failing the page.
pub async fn about_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<StaticPage>> {
    let mut contributors = match state.contributors.contributors().await {
        Ok(contributors) => contributors,
        Err(err) => {
            warn!(error = %err, "could not load contributors for about page");
            Vec::new()
        }
    };
    sort_contributors(&mut contributors);

    let mut page = StaticPage::titled(ABOUT_TITLE);
    page.contributors = contributors.into_iter().map(ContributorView::from).collect();

    Json(ApiResponse::success(page))
}

pub async fn open_source_handler() -> Json<ApiResponse<StaticPage>> {
    Json(ApiResponse::success(StaticPage::titled(OPEN_SOURCE_TITLE)))
}

pub async fn contact_handler() -> Json<ApiResponse<StaticPage>> {
    Json(ApiResponse::success(StaticPage::titled(CONTACT_TITLE)))
}
