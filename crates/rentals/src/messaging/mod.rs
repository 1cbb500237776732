//! Two-party conversations between tenants and staff.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{
    unread_count_for, Conversation, ConversationId, ConversationThread, Delivery, Inbox,
    InboxEntry, Message, MessageDraft, MessageId, NewConversation, OutgoingMessage, Reply,
    DEFAULT_SUBJECT,
};
pub use router::conversation_router;
pub use service::Messenger;
