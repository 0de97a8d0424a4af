pub mod compression;
pub mod cursor;
pub mod file;
