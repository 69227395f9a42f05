// src/handlers/mod.rs
pub mod output;
pub mod status;
pub mod video;
