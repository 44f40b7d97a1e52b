pub mod middleware;

pub use middleware::{Viewer, optional_auth_middleware};
