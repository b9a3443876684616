pub mod client;
pub mod models;
pub mod parsers;

pub use client::{BybitClient, BybitKeys, Network};
pub use parsers::BybitParser;
