//! Infrastructure layer: wire DTOs and record-store implementations.

pub mod dto;
pub mod repository;
