//! Query builders and lookups.

pub mod file;
pub mod member;
