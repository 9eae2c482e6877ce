pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod remote;
pub mod report;
pub mod request;
pub mod segment;
