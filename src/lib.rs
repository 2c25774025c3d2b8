pub mod config;
pub mod error;
pub mod generator;
pub mod io;
pub mod tee;
pub mod utils;

pub mod prelude;
