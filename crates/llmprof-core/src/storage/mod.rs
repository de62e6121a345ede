//! Storage layer (`SQLite`)

pub mod db;
pub mod migrations;
pub mod profiles;

pub use db::Database;
pub use profiles::ProfileStore;
