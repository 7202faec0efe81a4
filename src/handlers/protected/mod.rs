pub mod auth;
pub mod enterprises;
pub mod phyto_analyses;
pub mod species;
pub mod specimens;
pub mod users;
