pub mod cli;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod settings;
pub mod store;
pub mod utils;

pub use error::{Result, WeatherError};
