//! Key storage module.
//!
//! This module provides the file-backed per-owner keystore and its configuration.

pub mod config;
pub mod keystore;
