pub mod builtins;
pub mod notifications;
pub mod provider;
pub mod trigger;

pub use builtins::{BuiltinMember, BuiltinTable, BuiltinTables};
pub use notifications::{Notice, NoticeBroadcaster, NoticeLevel, Notifier, SilentNotifier};
pub use provider::{CompletionProvider, METHOD_SORT_KEY, PROPERTY_SORT_KEY, Suggestion};
pub use trigger::Trigger;
