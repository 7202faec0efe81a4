pub mod auth;
pub mod recover;
pub mod request_id;
pub mod tenant;
