//! Segmentation engine: recursive binary segmentation of a price series.
//!
//! Three layers, leaves first:
//!
//! 1. `refine`: two-stage admissibility rule over per-cut RSS gains
//! 2. `finder`: RSS gain of every cut in one partition
//! 3. `driver`: rounds of split search until no partition yields a new split

pub mod config;
pub mod driver;
pub mod finder;
pub mod refine;

pub use config::{EngineConfig, MaxSplits, MissingPolicy, RSS_TOLERANCE};
pub use driver::{segment, AcceptedSplit, Segmentation, Segmenter};
pub use finder::{find_split, rss_gains};
pub use refine::{argmax, refine, Refinement, SplitRule};
