pub mod archive;
pub mod config;
pub mod crlset;
pub mod crx;
pub mod fetch;
pub mod telemetry;
pub mod updater;
