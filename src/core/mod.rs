//! Core library components.
//!
//! This module contains the reusable logic for addressing, encrypting and
//! enumerating secrets.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod domain;
pub mod repository;
pub mod store;
pub mod types;
pub mod validation;
