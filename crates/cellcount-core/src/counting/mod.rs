//! Counting regions, modes and the per-region state machine.

pub mod board;
pub mod model;

pub use board::{CountingBoard, RegionCounts};
pub use model::{CountKind, CountTarget, CountingMode, Region, RegionCount};
