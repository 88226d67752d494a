pub mod statistical;
pub mod delta;
pub mod sweep;

pub use statistical::*;
pub use delta::*;
pub use sweep::*;
