//! # locale-relay
//!
//! A pluggable module contract plus a runtime-swappable localization
//! registry:
//! - **i18n**: message providers with non-failing lookups, and a registry
//!   that broadcasts locale changes to every provider
//! - **module**: the module lifecycle contract and a reference host

pub mod config;
pub mod i18n;
pub mod module;
