pub mod display;
pub mod finger;
pub mod hint;
pub mod layout;
pub mod model;

pub use hint::{KeyHint, KeyHintMapper, KeyPosition};
pub use layout::{KeyboardLayout, LayoutKind};
