pub mod routes;
pub mod types;

pub use types::{
    ApiResponse, ContributorView, EditableProfile, ProfileSaved, ProfileView,
    StaticPage,
};
