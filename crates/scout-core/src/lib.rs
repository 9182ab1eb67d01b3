pub mod aggregator;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod facet;
pub mod fuzzy;
pub mod memo;
pub mod model;
pub mod session;
pub mod timeline;
