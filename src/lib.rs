// Line-at-a-time editor library - exposes the core modules for testing

pub mod editor;
pub mod error;
pub mod session;
pub mod store;
pub mod terminal;
pub mod text;
pub mod view;

// Re-export commonly used types
pub use editor::{EditOutcome, KeyEditor, LineEditor};
pub use error::Error;
pub use session::Session;
pub use store::{Line, LineStore};
pub use text::Terminator;
pub use view::View;
