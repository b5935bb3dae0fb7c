pub mod category;
pub mod error;
pub mod query;
pub mod repository;
pub mod todo;
