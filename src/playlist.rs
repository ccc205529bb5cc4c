//! Playlist module: the immutable track list and the catalog loader that
//! builds it at startup.

mod catalog;
mod model;

pub use catalog::*;
pub use model::*;

#[cfg(test)]
mod tests;
