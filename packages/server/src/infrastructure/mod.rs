//! Infrastructure layer: concrete implementations of the domain
//! interfaces plus wire DTOs.

pub mod dto;
pub mod generation;
pub mod pusher;
pub mod repository;
pub mod verifier;
