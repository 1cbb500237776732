use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{
    unread_count_for, Conversation, ConversationId, ConversationThread, Delivery, Inbox,
    InboxEntry, Message, MessageDraft, NewConversation, OutgoingMessage, Reply, DEFAULT_SUBJECT,
};
use crate::access::{authorize, Actor, Capability};
use crate::accounts::UserAccount;
use crate::error::ServiceError;
use crate::notifications::{emit, NewNotification, NotificationKind};
use crate::store::{RentalStore, StoreTransaction};

/// Conversation threads and their read receipts.
pub struct Messenger<S> {
    store: Arc<S>,
}

impl<S> Messenger<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Sends to `recipient`, reusing the most recently active thread the pair already shares.
    pub fn start_or_continue(
        &self,
        sender: &Actor,
        outgoing: OutgoingMessage,
    ) -> Result<Delivery, ServiceError> {
        let content = required_content(&outgoing.content)?;
        if outgoing.recipient == sender.user_id {
            return Err(ServiceError::validation("You cannot message yourself."));
        }

        let delivery = self.store.transaction(|tx| {
            let recipient = tx.user(outgoing.recipient)?.ok_or_else(|| {
                ServiceError::not_found(format!("user {} not found", outgoing.recipient))
            })?;
            if !recipient.is_staff {
                authorize(sender, Capability::MessageAnyUser)?;
            }

            let now = Utc::now();
            let existing = tx
                .conversations_for(sender.user_id)?
                .into_iter()
                .find(|conversation| conversation.has_participant(recipient.id));
            let started_conversation = existing.is_none();
            let conversation = match existing {
                Some(conversation) => conversation,
                None => {
                    let subject = outgoing
                        .subject
                        .as_deref()
                        .map(str::trim)
                        .filter(|subject| !subject.is_empty())
                        .unwrap_or(DEFAULT_SUBJECT);
                    tx.insert_conversation(NewConversation {
                        participants: vec![sender.user_id, recipient.id],
                        subject: subject.to_string(),
                        created_at: now,
                    })?
                }
            };

            let (conversation, message) = post(tx, sender, conversation, content, now)?;
            Ok::<_, ServiceError>(Delivery {
                conversation,
                message,
                started_conversation,
            })
        })?;

        info!(
            conversation = %delivery.conversation.id,
            sender = %sender.username,
            started = delivery.started_conversation,
            "message sent"
        );
        Ok(delivery)
    }

    /// Returns the thread and marks everything the viewer received as read.
    pub fn open(
        &self,
        viewer: &Actor,
        id: ConversationId,
    ) -> Result<ConversationThread, ServiceError> {
        self.store.transaction(|tx| {
            let conversation = participating(tx, viewer, id)?;
            tx.mark_messages_read(conversation.id, viewer.user_id)?;
            let messages = tx.messages_in(conversation.id)?;
            let other_participant = other_account(tx, &conversation, viewer)?;
            Ok(ConversationThread {
                conversation,
                other_participant,
                messages,
            })
        })
    }

    pub fn reply(
        &self,
        sender: &Actor,
        id: ConversationId,
        reply: Reply,
    ) -> Result<Message, ServiceError> {
        let content = required_content(&reply.content)?;

        let message = self.store.transaction(|tx| {
            let conversation = participating(tx, sender, id)?;
            tx.mark_messages_read(conversation.id, sender.user_id)?;
            let (_, message) = post(tx, sender, conversation, content, Utc::now())?;
            Ok::<_, ServiceError>(message)
        })?;

        info!(conversation = %id, sender = %sender.username, "reply sent");
        Ok(message)
    }

    pub fn inbox(&self, user: &Actor) -> Result<Inbox, ServiceError> {
        self.store.transaction(|tx| {
            let mut entries = Vec::new();
            for conversation in tx.conversations_for(user.user_id)? {
                let messages = tx.messages_in(conversation.id)?;
                let unread_count = unread_count_for(&messages, user.user_id);
                let other_participant = other_account(tx, &conversation, user)?;
                entries.push(InboxEntry {
                    last_message: messages.into_iter().last(),
                    conversation,
                    other_participant,
                    unread_count,
                });
            }
            let total_unread = entries.iter().map(|entry| entry.unread_count).sum();
            Ok(Inbox {
                entries,
                total_unread,
            })
        })
    }
}

fn required_content(raw: &str) -> Result<&str, ServiceError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ServiceError::validation("Message content cannot be empty."));
    }
    Ok(content)
}

/// Non-participants are told the conversation does not exist.
fn participating(
    tx: &mut dyn StoreTransaction,
    actor: &Actor,
    id: ConversationId,
) -> Result<Conversation, ServiceError> {
    tx.conversation(id)?
        .filter(|conversation| conversation.has_participant(actor.user_id))
        .ok_or_else(|| ServiceError::not_found(format!("conversation {id} not found")))
}

fn other_account(
    tx: &mut dyn StoreTransaction,
    conversation: &Conversation,
    viewer: &Actor,
) -> Result<Option<UserAccount>, ServiceError> {
    match conversation.other_participant(viewer.user_id) {
        Some(other) => Ok(tx.user(other)?),
        None => Ok(None),
    }
}

/// Appends the message, bumps the thread and notifies every other participant.
fn post(
    tx: &mut dyn StoreTransaction,
    sender: &Actor,
    mut conversation: Conversation,
    content: &str,
    now: DateTime<Utc>,
) -> Result<(Conversation, Message), ServiceError> {
    let message = tx.insert_message(MessageDraft {
        conversation: conversation.id,
        sender: sender.user_id,
        content: content.to_string(),
        created_at: now,
    })?;
    conversation.updated_at = now;
    tx.save_conversation(conversation.clone())?;

    let text = format!("New message from {}", sender.username);
    let recipients: Vec<_> = conversation.others(sender.user_id).collect();
    for recipient in recipients {
        emit(
            tx,
            NewNotification::new(recipient, NotificationKind::NewMessage, None, text.as_str(), now),
        )?;
    }
    Ok((conversation, message))
}
