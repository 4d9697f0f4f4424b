pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod runtime;
pub mod service;
pub mod summary;
pub mod types;
pub mod xml_tree;
