//! Segment statistics that ignore missing observations.

pub mod moments;

pub use moments::{observed_mean, prefix_moments, suffix_moments, Moments};
