// Eulerian smoke simulation on a staggered grid

pub mod advection;
pub mod boundary;
pub mod field;
pub mod fluid;
pub mod gravity;
pub mod obstacle;
pub mod projection;
pub mod scenario;
pub mod task;
