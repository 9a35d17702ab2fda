// ui/mod.rs

mod draw;
pub mod game;
pub mod spinner;
pub mod viewport;

pub use draw::{MIN_HEIGHT, MIN_WIDTH, draw};
pub use viewport::TextViewport;
