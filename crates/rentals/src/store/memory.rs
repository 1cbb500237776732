use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{RentalStore, RepositoryError, StoreTransaction};
use crate::accounts::{NewAccount, TenantProfile, UserAccount, UserId};
use crate::apartments::{Apartment, ApartmentDraft, ApartmentId};
use crate::messaging::{
    Conversation, ConversationId, Message, MessageDraft, MessageId, NewConversation,
};
use crate::notifications::{NewNotification, Notification, NotificationId};
use crate::reservations::{NewReservation, Reservation, ReservationId};

/// In-process store. One mutex guards every table, so transactions are fully serialized;
/// each transaction works on a full copy of the tables that replaces the live ones only on
/// success. Reads go through [`RentalStore::read`] and borrow the live tables without copying.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RentalStore for MemoryStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut live = self
            .tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;

        let mut working = live.clone();
        let outcome = work(&mut working)?;
        *live = working;
        Ok(outcome)
    }

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreTransaction) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let live = self
            .tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))?;
        work(&*live)
    }
}

#[derive(Debug, Clone, Default)]
struct Sequences {
    users: u64,
    apartments: u64,
    reservations: u64,
    notifications: u64,
    conversations: u64,
    messages: u64,
}

fn next(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone, Default)]
struct Tables {
    sequences: Sequences,
    users: BTreeMap<UserId, UserAccount>,
    profiles: BTreeMap<UserId, TenantProfile>,
    apartments: BTreeMap<ApartmentId, Apartment>,
    reservations: BTreeMap<ReservationId, Reservation>,
    notifications: BTreeMap<NotificationId, Notification>,
    conversations: BTreeMap<ConversationId, Conversation>,
    messages: BTreeMap<MessageId, Message>,
}

impl Tables {
    fn unit_taken(&self, unit_number: &str, except: Option<ApartmentId>) -> bool {
        self.apartments
            .values()
            .any(|apartment| apartment.unit_number == unit_number && Some(apartment.id) != except)
    }
}

impl StoreTransaction for Tables {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.users.get(&id).cloned())
    }

    fn user_by_username(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self
            .users
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    fn users(&self) -> Result<Vec<UserAccount>, RepositoryError> {
        Ok(self.users.values().cloned().collect())
    }

    fn insert_user(&mut self, account: NewAccount) -> Result<UserAccount, RepositoryError> {
        if self
            .users
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(RepositoryError::Conflict(format!(
                "username '{}'",
                account.username
            )));
        }

        let record = UserAccount {
            id: UserId(next(&mut self.sequences.users)),
            username: account.username,
            full_name: account.full_name,
            email: account.email,
            is_staff: account.is_staff,
            joined_at: account.joined_at,
        };
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    fn tenant_profile(&self, user: UserId) -> Result<Option<TenantProfile>, RepositoryError> {
        Ok(self.profiles.get(&user).cloned())
    }

    fn insert_tenant_profile(&mut self, profile: TenantProfile) -> Result<(), RepositoryError> {
        if !self.users.contains_key(&profile.user_id) {
            return Err(RepositoryError::NotFound);
        }
        if self
            .profiles
            .values()
            .any(|existing| existing.id_number == profile.id_number)
        {
            return Err(RepositoryError::Conflict(format!(
                "id number '{}'",
                profile.id_number
            )));
        }
        if self.profiles.contains_key(&profile.user_id) {
            return Err(RepositoryError::Conflict(format!(
                "tenant profile for user {}",
                profile.user_id
            )));
        }
        self.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    fn apartment(&self, id: ApartmentId) -> Result<Option<Apartment>, RepositoryError> {
        Ok(self.apartments.get(&id).cloned())
    }

    fn apartment_by_unit(&self, unit_number: &str) -> Result<Option<Apartment>, RepositoryError> {
        Ok(self
            .apartments
            .values()
            .find(|apartment| apartment.unit_number == unit_number)
            .cloned())
    }

    fn apartments(&self) -> Result<Vec<Apartment>, RepositoryError> {
        let mut apartments: Vec<_> = self.apartments.values().cloned().collect();
        apartments.sort_by(|a, b| {
            a.floor
                .cmp(&b.floor)
                .then_with(|| a.unit_number.cmp(&b.unit_number))
        });
        Ok(apartments)
    }

    fn insert_apartment(
        &mut self,
        draft: ApartmentDraft,
        now: DateTime<Utc>,
    ) -> Result<Apartment, RepositoryError> {
        if self.unit_taken(&draft.unit_number, None) {
            return Err(RepositoryError::Conflict(format!(
                "unit '{}'",
                draft.unit_number
            )));
        }

        let record = Apartment {
            id: ApartmentId(next(&mut self.sequences.apartments)),
            name: draft.name,
            apartment_type: draft.apartment_type,
            floor: draft.floor,
            unit_number: draft.unit_number,
            price_per_month: draft.price_per_month,
            size_sqm: draft.size_sqm,
            bedrooms: draft.bedrooms,
            bathrooms: draft.bathrooms,
            status: draft.status,
            description: draft.description,
            amenities: draft.amenities,
            image: draft.image,
            created_at: now,
            updated_at: now,
        };
        self.apartments.insert(record.id, record.clone());
        Ok(record)
    }

    fn save_apartment(&mut self, apartment: Apartment) -> Result<(), RepositoryError> {
        if !self.apartments.contains_key(&apartment.id) {
            return Err(RepositoryError::NotFound);
        }
        if self.unit_taken(&apartment.unit_number, Some(apartment.id)) {
            return Err(RepositoryError::Conflict(format!(
                "unit '{}'",
                apartment.unit_number
            )));
        }
        self.apartments.insert(apartment.id, apartment);
        Ok(())
    }

    fn delete_apartment(&mut self, id: ApartmentId) -> Result<(), RepositoryError> {
        if self.apartments.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let removed: Vec<ReservationId> = self
            .reservations
            .values()
            .filter(|reservation| reservation.apartment == id)
            .map(|reservation| reservation.id)
            .collect();
        for reservation in &removed {
            self.reservations.remove(reservation);
        }
        self.notifications.retain(|_, notification| {
            notification
                .reservation
                .map_or(true, |reservation| !removed.contains(&reservation))
        });
        Ok(())
    }

    fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, RepositoryError> {
        Ok(self.reservations.get(&id).cloned())
    }

    fn reservations(&self) -> Result<Vec<Reservation>, RepositoryError> {
        let mut reservations: Vec<_> = self.reservations.values().cloned().collect();
        reservations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(reservations)
    }

    fn insert_reservation(
        &mut self,
        reservation: NewReservation,
    ) -> Result<Reservation, RepositoryError> {
        if !self.users.contains_key(&reservation.tenant)
            || !self.apartments.contains_key(&reservation.apartment)
        {
            return Err(RepositoryError::NotFound);
        }

        let record = Reservation {
            id: ReservationId(next(&mut self.sequences.reservations)),
            tenant: reservation.tenant,
            apartment: reservation.apartment,
            move_in: reservation.move_in,
            total_price: reservation.total_price,
            status: reservation.status,
            reviewed_by: reservation.reviewed_by,
            reviewed_at: reservation.reviewed_at,
            admin_notes: String::new(),
            special_requests: reservation.special_requests,
            created_at: reservation.created_at,
            updated_at: reservation.created_at,
        };
        self.reservations.insert(record.id, record.clone());
        Ok(record)
    }

    fn save_reservation(&mut self, reservation: Reservation) -> Result<(), RepositoryError> {
        if !self.reservations.contains_key(&reservation.id) {
            return Err(RepositoryError::NotFound);
        }
        self.reservations.insert(reservation.id, reservation);
        Ok(())
    }

    fn notification(&self, id: NotificationId) -> Result<Option<Notification>, RepositoryError> {
        Ok(self.notifications.get(&id).cloned())
    }

    fn notifications_for(&self, user: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let mut notifications: Vec<_> = self
            .notifications
            .values()
            .filter(|notification| notification.user == user)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }

    fn insert_notification(
        &mut self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        if !self.users.contains_key(&notification.user) {
            return Err(RepositoryError::NotFound);
        }

        let record = Notification {
            id: NotificationId(next(&mut self.sequences.notifications)),
            user: notification.user,
            kind: notification.kind,
            reservation: notification.reservation,
            message: notification.message,
            is_read: false,
            created_at: notification.created_at,
        };
        self.notifications.insert(record.id, record.clone());
        Ok(record)
    }

    fn save_notification(&mut self, notification: Notification) -> Result<(), RepositoryError> {
        if !self.notifications.contains_key(&notification.id) {
            return Err(RepositoryError::NotFound);
        }
        self.notifications.insert(notification.id, notification);
        Ok(())
    }

    fn delete_notification(&mut self, id: NotificationId) -> Result<(), RepositoryError> {
        self.notifications
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_notifications_for(&mut self, user: UserId) -> Result<usize, RepositoryError> {
        let before = self.notifications.len();
        self.notifications
            .retain(|_, notification| notification.user != user);
        Ok(before - self.notifications.len())
    }

    fn conversation(&self, id: ConversationId) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self.conversations.get(&id).cloned())
    }

    fn conversations_for(&self, user: UserId) -> Result<Vec<Conversation>, RepositoryError> {
        let mut conversations: Vec<_> = self
            .conversations
            .values()
            .filter(|conversation| conversation.has_participant(user))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(conversations)
    }

    fn insert_conversation(
        &mut self,
        conversation: NewConversation,
    ) -> Result<Conversation, RepositoryError> {
        if let Some(missing) = conversation
            .participants
            .iter()
            .find(|participant| !self.users.contains_key(*participant))
        {
            tracing::debug!(user = %missing, "conversation participant does not exist");
            return Err(RepositoryError::NotFound);
        }

        let record = Conversation {
            id: ConversationId(next(&mut self.sequences.conversations)),
            participants: conversation.participants,
            subject: conversation.subject,
            created_at: conversation.created_at,
            updated_at: conversation.created_at,
        };
        self.conversations.insert(record.id, record.clone());
        Ok(record)
    }

    fn save_conversation(&mut self, conversation: Conversation) -> Result<(), RepositoryError> {
        if !self.conversations.contains_key(&conversation.id) {
            return Err(RepositoryError::NotFound);
        }
        self.conversations.insert(conversation.id, conversation);
        Ok(())
    }

    fn messages_in(&self, conversation: ConversationId) -> Result<Vec<Message>, RepositoryError> {
        let mut messages: Vec<_> = self
            .messages
            .values()
            .filter(|message| message.conversation == conversation)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    fn insert_message(&mut self, message: MessageDraft) -> Result<Message, RepositoryError> {
        if !self.conversations.contains_key(&message.conversation) {
            return Err(RepositoryError::NotFound);
        }

        let record = Message {
            id: MessageId(next(&mut self.sequences.messages)),
            conversation: message.conversation,
            sender: message.sender,
            content: message.content,
            is_read: false,
            created_at: message.created_at,
        };
        self.messages.insert(record.id, record.clone());
        Ok(record)
    }

    fn mark_messages_read(
        &mut self,
        conversation: ConversationId,
        reader: UserId,
    ) -> Result<usize, RepositoryError> {
        let mut changed = 0;
        for message in self.messages.values_mut() {
            if message.conversation == conversation && message.sender != reader && !message.is_read
            {
                message.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }
}
