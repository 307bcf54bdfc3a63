//! Window Statistics
//!
//! Mean and standard deviation over centered rolling windows or a whole
//! series, and the z-scores derived from them.

mod rolling;
mod statistics;

pub use rolling::RollingWindow;
pub use statistics::WindowStats;
