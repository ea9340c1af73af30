pub mod analyze;
pub mod capacity;
pub mod config;
pub mod population;
pub mod tessellate;
pub mod util;
