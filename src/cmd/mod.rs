//! Command handlers for the assistant CLI

pub mod convert;
pub mod migrate;
pub mod split;
pub mod validate;
