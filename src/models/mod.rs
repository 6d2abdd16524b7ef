// src/models/mod.rs
pub mod drink;
pub mod telegram;
pub mod usage;
