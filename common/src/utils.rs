pub mod files;
pub mod patterns;
