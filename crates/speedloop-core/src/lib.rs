pub mod cancel;
pub mod config;
pub mod error;
pub mod logging;
pub mod measure;
pub mod report;
pub mod runner;
pub mod sample;
