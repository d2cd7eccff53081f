pub mod practice;
pub mod result;
pub mod text;

pub use practice::{Preedit, PracticeSession};
pub use result::RoundResult;
pub use text::PracticeText;
