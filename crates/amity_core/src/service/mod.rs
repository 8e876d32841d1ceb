//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into room registry, allocation and
//!   reallocation use-cases.
//! - Keep CLI callers decoupled from storage details.

pub mod allocation_service;
pub mod reallocation_service;
pub mod room_service;
