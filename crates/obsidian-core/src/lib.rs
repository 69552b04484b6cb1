//! Core Obsidian client library (config, storage, API client, auth, admin features).

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod consent;
pub mod dashboard;
pub mod email;
pub mod forms;
pub mod guard;
pub mod logging;
pub mod models;
pub mod newsletter;
pub mod router;
pub mod slice;
pub mod storage;
