// Middleware layers

pub mod cors;

pub use cors::*;
