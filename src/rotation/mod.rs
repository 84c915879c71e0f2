//! Renaming, pruning and catch-up detection for rotated log files.

mod catch_up;
pub mod naming;
mod pruner;
mod rotator;

pub use catch_up::find_missed_rotations;
pub use naming::{compressed_path, rotated_path};
pub use pruner::{MAX_HISTORY, Pruner};
pub use rotator::Rotator;
