//! Upload storage adapters

pub mod local;

pub use local::LocalFileStorage;
