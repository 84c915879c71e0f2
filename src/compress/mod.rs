mod queue;
mod spawner;

pub use queue::{CompressionQueue, InFlight};
pub use spawner::CommandSpawner;
