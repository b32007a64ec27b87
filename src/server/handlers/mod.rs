pub mod admin;
pub mod health;
pub mod jerseys;
pub mod names;
pub mod pages;
