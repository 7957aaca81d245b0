pub mod file;
pub mod member;
