pub mod models;
pub mod pool;
pub mod repos;
pub mod uow;
