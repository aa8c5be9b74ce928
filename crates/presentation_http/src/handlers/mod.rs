//! HTTP request handlers

pub mod chat;
pub mod health;
pub mod model;
pub mod system;
