pub mod app;
pub mod cli;
pub mod config;
pub mod loader;
pub mod model;
pub mod output;
pub mod prefs;
pub mod runner;
pub mod session;
pub mod state;
pub mod transform;
pub mod view;

#[cfg(test)]
mod tests;
