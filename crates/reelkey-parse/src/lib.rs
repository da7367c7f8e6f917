pub mod kind;
pub mod page;
pub mod shortcut;
pub mod title;

pub use kind::MediaKind;
pub use page::PageMetadata;
pub use shortcut::{KeyEvent, Modifiers, ShortcutError, ShortcutSpec};
pub use title::TitlePattern;
