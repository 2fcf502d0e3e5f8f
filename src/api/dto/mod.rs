//! Data Transfer Objects for the diagnostic REST surface.

pub mod room_dto;

pub use room_dto::*;
