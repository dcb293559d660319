//! Earthquake damage inspection dashboard for Circle Condominium.
//!
//! The [`data`] module holds the load → filter → aggregate pipeline; the
//! [`presenter`] trait is the only thing the pipeline knows about rendering.

pub mod config;
pub mod data;
pub mod error;
pub mod presenter;
