pub mod auth;
pub mod dispatch;
pub mod feed;
pub mod post;
pub mod profile;
