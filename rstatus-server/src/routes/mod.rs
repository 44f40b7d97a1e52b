use axum::{Router, middleware, routing::get};
use rstatus_core::api::routes::{self, users};

use crate::auth::optional_auth_middleware;
use crate::handlers::{profiles, static_pages};
use crate::infra::app_state::AppState;

/// All application routes. Every route sees the optional [`Viewer`].
///
/// [`Viewer`]: crate::auth::Viewer
pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(routes::HOMEPAGE, get(static_pages::homepage_handler))
        .route(routes::ABOUT, get(static_pages::about_handler))
        .route(routes::OPEN_SOURCE, get(static_pages::open_source_handler))
        .route(routes::CONTACT, get(static_pages::contact_handler))
        .route(
            users::PROFILE,
            get(profiles::show_profile_handler)
                .post(profiles::update_profile_handler),
        )
        .route(users::EDIT, get(profiles::edit_profile_handler))
        .layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ))
}
