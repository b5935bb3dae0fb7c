pub mod category_service;
pub mod todo_service;

#[cfg(test)]
mod fakes;
mod category_service_tests;
