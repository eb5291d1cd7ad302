//! Configuration: environment-derived settings plus fixed constants
//! (roles, defaults, auth header scheme).

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
