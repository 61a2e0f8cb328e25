//! Shared rendering helpers used across screens.

pub mod hex;
pub mod props;
