pub mod archive;
pub mod cli;
pub mod config;
pub mod db;
pub mod embed;
mod metrics;
pub mod ranking;
mod server;
pub mod utils;

pub use archive::{PhotoArchive, PhotoArchiveBuilder};
pub use config::Opts;
pub use db::ImageRecord;
