// src/matching/mod.rs

pub mod name;
