//! Persistence seam for the rental workflows.
//!
//! Every lifecycle command runs inside one [`RentalStore::transaction`]. Writes made through
//! the [`StoreTransaction`] become visible together when the closure returns `Ok`, and are
//! discarded when it returns `Err`. Implementations serialize transactions that touch the
//! same rows, so the availability check and the reservation insert cannot interleave with
//! a competing booking.

mod memory;

pub use memory::MemoryStore;

use crate::accounts::{NewAccount, TenantProfile, UserAccount, UserId};
use crate::apartments::{Apartment, ApartmentDraft, ApartmentId};
use crate::messaging::{Conversation, ConversationId, Message, MessageDraft, NewConversation};
use crate::notifications::{NewNotification, Notification, NotificationId};
use crate::reservations::{NewReservation, Reservation, ReservationId};
use chrono::{DateTime, Utc};

/// Storage abstraction so the services can be exercised in isolation.
pub trait RentalStore: Send + Sync {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Read-only work against the committed state. Stores that stage writes can skip the
    /// staging here; the default simply runs a transaction.
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.transaction(|tx| work(&*tx))
    }
}

/// Row-level access available inside a transaction.
pub trait StoreTransaction {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn user_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError>;
    fn users(&self) -> Result<Vec<UserAccount>, RepositoryError>;
    fn insert_user(&mut self, account: NewAccount) -> Result<UserAccount, RepositoryError>;
    fn tenant_profile(&self, user: UserId) -> Result<Option<TenantProfile>, RepositoryError>;
    fn insert_tenant_profile(&mut self, profile: TenantProfile) -> Result<(), RepositoryError>;

    fn apartment(&self, id: ApartmentId) -> Result<Option<Apartment>, RepositoryError>;
    fn apartment_by_unit(&self, unit_number: &str) -> Result<Option<Apartment>, RepositoryError>;
    /// Ordered by floor, then unit number.
    fn apartments(&self) -> Result<Vec<Apartment>, RepositoryError>;
    fn insert_apartment(
        &mut self,
        draft: ApartmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Apartment, RepositoryError>;
    fn save_apartment(&mut self, apartment: Apartment) -> Result<(), RepositoryError>;
    /// Removes the apartment, its reservations and their notifications.
    fn delete_apartment(&mut self, id: ApartmentId) -> Result<(), RepositoryError>;

    fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, RepositoryError>;
    /// Newest first.
    fn reservations(&self) -> Result<Vec<Reservation>, RepositoryError>;
    fn insert_reservation(
        &mut self,
        reservation: NewReservation,
    ) -> Result<Reservation, RepositoryError>;
    fn save_reservation(&mut self, reservation: Reservation) -> Result<(), RepositoryError>;

    fn notification(&self, id: NotificationId) -> Result<Option<Notification>, RepositoryError>;
    /// Newest first.
    fn notifications_for(&self, user: UserId) -> Result<Vec<Notification>, RepositoryError>;
    fn insert_notification(
        &mut self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError>;
    fn save_notification(&mut self, notification: Notification) -> Result<(), RepositoryError>;
    fn delete_notification(&mut self, id: NotificationId) -> Result<(), RepositoryError>;
    fn delete_notifications_for(&mut self, user: UserId) -> Result<usize, RepositoryError>;

    fn conversation(&self, id: ConversationId) -> Result<Option<Conversation>, RepositoryError>;
    /// Most recently updated first.
    fn conversations_for(&self, user: UserId) -> Result<Vec<Conversation>, RepositoryError>;
    fn insert_conversation(
        &mut self,
        conversation: NewConversation,
    ) -> Result<Conversation, RepositoryError>;
    fn save_conversation(&mut self, conversation: Conversation) -> Result<(), RepositoryError>;
    /// Oldest first.
    fn messages_in(&self, conversation: ConversationId) -> Result<Vec<Message>, RepositoryError>;
    fn insert_message(&mut self, message: MessageDraft) -> Result<Message, RepositoryError>;
    /// Marks messages not sent by `reader` as read; returns how many changed.
    fn mark_messages_read(
        &mut self,
        conversation: ConversationId,
        reader: UserId,
    ) -> Result<usize, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} already exists")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
