mod pointer;

pub use pointer::{InputTracker, PointerSender, PointerState};

#[cfg(test)]
pub use pointer::PointerSample;
