pub mod agent;
pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod errors;
pub mod marketing;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod runtime;
pub mod systems;
