//! `limelight-core` — shared domain types, configuration and errors.
//!
//! Everything the subsystem crates agree on lives here: the [`types::Persona`]
//! identity record, the [`types::ContentType`] and [`types::GenerationPrompt`]
//! vocabulary, and the figment-backed [`config::LimelightConfig`].

pub mod config;
pub mod error;
pub mod types;

pub use error::{LimelightError, Result};
pub use types::{ContentType, GenerationPrompt, Persona, PersonaId, PostingFrequency};
