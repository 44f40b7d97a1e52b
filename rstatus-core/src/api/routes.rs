//! Route definitions shared between the server router and its tests.

pub const HOMEPAGE: &str = "/";
pub const ABOUT: &str = "/about";
pub const OPEN_SOURCE: &str = "/open_source";
pub const CONTACT: &str = "/contact";

pub mod users {
    pub const PROFILE: &str = "/users/{username}";
    pub const EDIT: &str = "/users/{username}/edit";

    /// Public profile path for a stored username.
    pub fn profile_path(username: impl AsRef<str>) -> String {
        super::utils::replace_param(PROFILE, "{username}", username)
    }

    /// Edit form path for a stored username.
    pub fn edit_path(username: impl AsRef<str>) -> String {
        super::utils::replace_param(EDIT, "{username}", username)
    }
}

pub mod utils {
    /// Replace a single path parameter (e.g. `"{username}"`) with the provided value.
    pub fn replace_param(
        route: &str,
        param: &str,
        value: impl AsRef<str>,
    ) -> String {
        route.replace(param, value.as_ref())
    }
}
