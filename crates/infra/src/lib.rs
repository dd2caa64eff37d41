//! Infrastructure layer: database pool wiring and catalog repositories.

pub mod db;
pub mod repository;
