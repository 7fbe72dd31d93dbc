//! Configuration and domain types shared by every module

pub mod config;
pub mod models;
