//! Terminal front end: argument parsing, logging, effect execution and rendering.
mod app;
mod cli;
mod effects;
mod logging;
mod ui;

pub use app::run;
