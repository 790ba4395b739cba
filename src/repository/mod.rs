// src/repository/mod.rs

//! Repository access
//!
//! This module provides:
//! - Mirror access over HTTP(S) or from a local directory
//! - Release and Packages files deserialized with `rfc822-like`
//! - The package catalog consumed by the auditor

mod catalog;
mod client;

pub use catalog::{MULTI_ARCH_SAME, MirrorCatalog, PackageRecord, RecordStream, RepositoryCatalog};
pub use client::Mirror;
