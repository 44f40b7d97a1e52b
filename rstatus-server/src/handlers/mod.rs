pub mod payload;
pub mod profiles;
pub mod static_pages;
