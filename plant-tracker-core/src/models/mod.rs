mod occupancy;
mod plant;
mod pot;
mod soil;

pub use occupancy::*;
pub use plant::*;
pub use pot::*;
pub use soil::*;
