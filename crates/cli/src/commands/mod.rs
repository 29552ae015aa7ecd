pub mod analyze;
pub mod config;
pub mod lookup;
pub mod rules;
pub mod util;

pub use analyze::*;
pub use config::*;
pub use lookup::*;
pub use rules::*;
pub use util::*;
