// src/handlers/mod.rs
pub mod status;
pub mod webhook;
