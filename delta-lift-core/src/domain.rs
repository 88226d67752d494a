pub mod scenario;
pub mod result;
pub mod sweep;
pub mod presets;

pub use scenario::*;
pub use result::*;
pub use sweep::*;
pub use presets::*;
