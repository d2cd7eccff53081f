pub mod directive;
pub mod interpreter;
pub mod navigation;
pub mod pool;

pub use directive::Directive;
pub use interpreter::{EngineMode, LessonInterpreter};
pub use navigation::Navigation;
pub use pool::RandomPool;
