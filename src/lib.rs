pub mod common;
pub mod configs;
pub mod extractor;
pub mod resolver;
pub mod rest;
pub mod server;
pub mod sources;
