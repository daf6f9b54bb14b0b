#[macro_use]
mod macros;

pub mod energy;
pub mod power;
pub mod price;
pub mod proportions;
pub mod time;
