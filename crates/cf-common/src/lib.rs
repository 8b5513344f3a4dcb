//! Common types shared by the cf-audit checking engines.
//!
//! This crate defines the in-memory labeled dataset model: named
//! dimensions, 1-D coordinate variables, N-D data variables, and
//! free-form attribute maps. The checking engines consume datasets
//! only through this API and never mutate them; fixes always produce
//! a new `Dataset`.

pub mod attr;
pub mod dataset;
pub mod error;

pub use attr::{AttrMap, AttrValue};
pub use dataset::{Dataset, Variable};
pub use error::{DatasetError, DatasetResult};
