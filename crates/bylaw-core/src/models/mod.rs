//! Data models: configuration, extraction results, sites and documents.

pub mod config;
pub mod document;
pub mod result;
pub mod site;
