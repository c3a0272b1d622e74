pub mod config;
pub mod registry;

pub use config::Config;
pub use registry::Registry;
