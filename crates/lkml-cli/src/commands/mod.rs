//! CLI command implementations

pub(crate) mod common;
pub(crate) mod lint;
pub(crate) mod rules;
