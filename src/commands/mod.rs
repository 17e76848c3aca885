//! Command implementations for pagebrief CLI

mod ask;
mod cache;
mod misc;
mod page;

pub use ask::*;
pub use cache::*;
pub use misc::*;
pub use page::*;
