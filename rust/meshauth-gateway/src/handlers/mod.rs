mod identify;

pub use identify::*;
