#![doc = "repo-harvest-core: repository acquisition and conversion pipeline."]

//! Clones the repositories named in a manifest and turns each one into a
//! line-delimited JSON corpus: one artifact per repository, one record per
//! eligible source file.
//!
//! # Usage
//! Build a [`config::HarvestConfig`], pick a [`contract::Cloner`] (normally
//! [`clone::GitCloner`]) and call [`harvest::harvest`]. The building blocks
//! ([`classify`], [`decode`], [`document`], [`convert`]) are public for callers
//! that only need to convert directories already on disk.

pub mod classify;
pub mod clone;
pub mod config;
pub mod contract;
pub mod convert;
pub mod decode;
pub mod document;
pub mod harvest;
pub mod manifest;
