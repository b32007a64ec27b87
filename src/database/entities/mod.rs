pub mod derby_jerseys;
pub mod derby_names;
