//! Quick Deals - marketplace backend core.
//!
//! Accounts (registration, login, bearer tokens), carts and atomic
//! checkout over a relational store.
//!
//! # Layers
//!
//! - **cli** / **commands**: `serve` and `migrate`
//! - **config**: environment configuration and constants
//! - **domain**: users, passwords, carts and orders
//! - **services**: use cases behind traits
//! - **infra**: SeaORM entities, repositories, unit of work, migrations
//! - **api**: axum handlers, bearer middleware and routes
//! - **types**: response envelopes
//! - **errors**: error taxonomy and HTTP mapping

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
