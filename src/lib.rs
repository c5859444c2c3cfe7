//! Innerlight: a small journaling-companion site.
//!
//! The library holds the page controllers (landing, chat, auth form), the
//! auth facade over Supabase GoTrue, and the Axum router that serves the
//! static site. The binary wires them together from the environment.

pub mod auth;
pub mod config;
pub mod pages;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;
