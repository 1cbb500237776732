use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{NewNotification, Notification, NotificationFeed, NotificationId};
use crate::access::Actor;
use crate::error::ServiceError;
use crate::store::{RentalStore, RepositoryError, StoreTransaction};

/// Appends one unread entry inside the caller's transaction.
pub fn emit(
    tx: &mut dyn StoreTransaction,
    notification: NewNotification,
) -> Result<Notification, RepositoryError> {
    let stored = tx.insert_notification(notification)?;
    debug!(
        user = %stored.user,
        kind = ?stored.kind,
        notification_id = %stored.id,
        "notification emitted"
    );
    Ok(stored)
}

/// Read/acknowledge/delete operations a user performs on their own notifications.
pub struct NotificationCenter<S> {
    store: Arc<S>,
}

impl<S> NotificationCenter<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn feed(&self, actor: &Actor) -> Result<NotificationFeed, ServiceError> {
        self.store.read(|tx| {
            let notifications = tx.notifications_for(actor.user_id)?;
            let unread_count = notifications.iter().filter(|n| !n.is_read).count();
            Ok(NotificationFeed {
                notifications,
                unread_count,
            })
        })
    }

    pub fn unread_count(&self, actor: &Actor) -> Result<usize, ServiceError> {
        self.feed(actor).map(|feed| feed.unread_count)
    }

    pub fn mark_read(
        &self,
        actor: &Actor,
        id: NotificationId,
    ) -> Result<Notification, ServiceError> {
        self.store.transaction(|tx| {
            let mut notification = owned(tx, actor, id)?;
            notification.is_read = true;
            tx.save_notification(notification.clone())?;
            Ok(notification)
        })
    }

    /// Returns how many notifications flipped from unread to read.
    pub fn mark_all_read(&self, actor: &Actor) -> Result<usize, ServiceError> {
        self.store.transaction(|tx| {
            let mut changed = 0;
            for mut notification in tx.notifications_for(actor.user_id)? {
                if notification.is_read {
                    continue;
                }
                notification.is_read = true;
                tx.save_notification(notification)?;
                changed += 1;
            }
            Ok(changed)
        })
    }

    pub fn delete(&self, actor: &Actor, id: NotificationId) -> Result<(), ServiceError> {
        self.store.transaction(|tx| {
            owned(tx, actor, id)?;
            tx.delete_notification(id)?;
            Ok(())
        })
    }

    /// Deletes every notification owned by the actor and reports how many were removed.
    pub fn clear_all(&self, actor: &Actor) -> Result<usize, ServiceError> {
        let removed = self
            .store
            .transaction(|tx| tx.delete_notifications_for(actor.user_id))?;
        info!(user = %actor.user_id, removed, "notifications cleared");
        Ok(removed)
    }
}

fn owned(
    tx: &mut dyn StoreTransaction,
    actor: &Actor,
    id: NotificationId,
) -> Result<Notification, ServiceError> {
    let notification = tx
        .notification(id)?
        .ok_or_else(|| ServiceError::not_found(format!("notification {id} not found")))?;
    if notification.user != actor.user_id {
        return Err(ServiceError::permission(
            "You can only manage your own notifications.",
        ));
    }
    Ok(notification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationKind;
    use crate::testing::{actor_for, seed_user, Fixture};
    use chrono::Utc;

    fn push(fixture: &Fixture, actor: &Actor, message: &str) -> Notification {
        fixture
            .store
            .transaction(|tx| {
                emit(
                    tx,
                    NewNotification::new(
                        actor.user_id,
                        NotificationKind::NewMessage,
                        None,
                        message,
                        Utc::now(),
                    ),
                )
            })
            .expect("emit succeeds")
    }

    #[test]
    fn feed_lists_newest_first_with_unread_total() {
        let fixture = Fixture::new();
        let tenant = actor_for(&seed_user(&fixture.store, "ana", false));
        push(&fixture, &tenant, "first");
        push(&fixture, &tenant, "second");

        let feed = fixture.rentals.notifications.feed(&tenant).expect("feed");
        assert_eq!(feed.unread_count, 2);
        assert_eq!(feed.notifications[0].message, "second");
        assert_eq!(feed.notifications[1].message, "first");
    }

    #[test]
    fn mark_read_rejects_other_users() {
        let fixture = Fixture::new();
        let owner = actor_for(&seed_user(&fixture.store, "ana", false));
        let intruder = actor_for(&seed_user(&fixture.store, "ben", false));
        let notification = push(&fixture, &owner, "yours");

        match fixture
            .rentals
            .notifications
            .mark_read(&intruder, notification.id)
        {
            Err(ServiceError::Permission(_)) => {}
            other => panic!("expected permission error, got {other:?}"),
        }

        let updated = fixture
            .rentals
            .notifications
            .mark_read(&owner, notification.id)
            .expect("owner marks read");
        assert!(updated.is_read);
        assert_eq!(
            fixture
                .rentals
                .notifications
                .unread_count(&owner)
                .expect("count"),
            0
        );
    }

    #[test]
    fn missing_notification_is_not_found() {
        let fixture = Fixture::new();
        let owner = actor_for(&seed_user(&fixture.store, "ana", false));
        assert!(matches!(
            fixture
                .rentals
                .notifications
                .delete(&owner, NotificationId(404)),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn delete_is_limited_to_the_owner() {
        let fixture = Fixture::new();
        let owner = actor_for(&seed_user(&fixture.store, "ana", false));
        let intruder = actor_for(&seed_user(&fixture.store, "ben", false));
        let doomed = push(&fixture, &owner, "remove me");
        let guarded = push(&fixture, &owner, "not yours");
        let notifications = &fixture.rentals.notifications;

        notifications
            .delete(&owner, doomed.id)
            .expect("owner deletes");
        let feed = notifications.feed(&owner).expect("feed");
        assert_eq!(feed.notifications.len(), 1);
        assert_eq!(feed.notifications[0].id, guarded.id);

        assert!(matches!(
            notifications.delete(&intruder, guarded.id),
            Err(ServiceError::Permission(_))
        ));
        let feed = notifications.feed(&owner).expect("feed");
        assert_eq!(feed.notifications.len(), 1);
        assert_eq!(feed.notifications[0].id, guarded.id);
    }

    #[test]
    fn clear_all_reports_removed_count_and_spares_other_users() {
        let fixture = Fixture::new();
        let ana = actor_for(&seed_user(&fixture.store, "ana", false));
        let ben = actor_for(&seed_user(&fixture.store, "ben", false));
        push(&fixture, &ana, "one");
        push(&fixture, &ana, "two");
        push(&fixture, &ana, "three");
        push(&fixture, &ben, "keep me");

        let removed = fixture
            .rentals
            .notifications
            .clear_all(&ana)
            .expect("clear");
        assert_eq!(removed, 3);
        assert!(fixture
            .rentals
            .notifications
            .feed(&ana)
            .expect("feed")
            .notifications
            .is_empty());
        assert_eq!(
            fixture
                .rentals
                .notifications
                .feed(&ben)
                .expect("feed")
                .notifications
                .len(),
            1
        );
    }

    #[test]
    fn mark_all_read_counts_only_unread() {
        let fixture = Fixture::new();
        let ana = actor_for(&seed_user(&fixture.store, "ana", false));
        let first = push(&fixture, &ana, "one");
        push(&fixture, &ana, "two");
        fixture
            .rentals
            .notifications
            .mark_read(&ana, first.id)
            .expect("mark one");

        assert_eq!(
            fixture
                .rentals
                .notifications
                .mark_all_read(&ana)
                .expect("mark all"),
            1
        );
    }
}
