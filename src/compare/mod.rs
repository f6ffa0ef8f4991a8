//! Structural comparison of a synthesized descriptor against a trusted reference
//!
//! Both documents are normalized (volatile fields replaced by sentinels), then
//! checked for functional compatibility of the startup line and container
//! images, then diffed recursively. Each difference is classified as critical
//! or cosmetic and the verdict carries a similarity score over the reference.

pub mod comparator;
pub mod difference;

pub use comparator::{DescriptorComparator, DEFAULT_MATCH_THRESHOLD, SOURCE_URL_ENV};
pub use difference::{ComparisonVerdict, Difference};
