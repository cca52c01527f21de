pub mod conversation;
pub mod state;
pub mod store;

pub use conversation::{Conversation, Keyboard, Reply};
