use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::accounts::{UserAccount, UserId};

pub const DEFAULT_SUBJECT: &str = "General Inquiry";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub u64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

/// Participant set plus subject line; messages are stored separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<UserId>,
    pub subject: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user: UserId) -> bool {
        self.participants.contains(&user)
    }

    pub fn others(&self, user: UserId) -> impl Iterator<Item = UserId> + '_ {
        self.participants
            .iter()
            .copied()
            .filter(move |participant| *participant != user)
    }

    pub fn other_participant(&self, user: UserId) -> Option<UserId> {
        self.others(user).next()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation: ConversationId,
    pub sender: UserId,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConversation {
    pub participants: Vec<UserId>,
    pub subject: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub conversation: ConversationId,
    pub sender: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// First message to a recipient; continues an existing thread when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub recipient: UserId,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub content: String,
}

/// Result of sending: the thread the message landed in and whether it was new.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub conversation: Conversation,
    pub message: Message,
    pub started_conversation: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationThread {
    pub conversation: Conversation,
    pub other_participant: Option<UserAccount>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxEntry {
    pub conversation: Conversation,
    pub other_participant: Option<UserAccount>,
    pub last_message: Option<Message>,
    pub unread_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inbox {
    pub entries: Vec<InboxEntry>,
    pub total_unread: usize,
}

/// Unread messages that were not sent by `reader`.
pub fn unread_count_for(messages: &[Message], reader: UserId) -> usize {
    messages
        .iter()
        .filter(|message| message.sender != reader && !message.is_read)
        .count()
}
