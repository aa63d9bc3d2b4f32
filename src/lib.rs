//! Core library for the lista shared to-do list service.
//!
//! This crate exposes the HTTP API, list access rules, the real-time relay
//! and the database helpers behind them. Only one database backend (either
//! `sqlite` or `postgres`) should be enabled at a time; the backend is
//! selected in [`db`].

pub mod access;
pub mod api;
pub mod db;
pub mod models;
pub mod relay;
pub mod schema;
pub mod server;
pub mod users;
