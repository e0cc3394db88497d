//! Core math modules.

pub mod correlation;
pub mod descriptive;
pub mod polyfit;
