// Consumers of simulation frames: PNG stream and live window

pub mod imgstream;
pub mod window;
