pub mod db;
pub mod sqlite_category_repo;
pub mod sqlite_repo;
