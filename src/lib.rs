//! Quill - A small blog publishing backend
//!
//! This library provides posts, tags, comments and likes, the popular and
//! fresh post rankings, and the themed pages and JSON API built on them.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
