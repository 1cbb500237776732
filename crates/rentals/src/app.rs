use std::sync::Arc;

use crate::accounts::AccountDirectory;
use crate::apartments::ApartmentRegistry;
use crate::dashboard::Dashboard;
use crate::messaging::Messenger;
use crate::notifications::NotificationCenter;
use crate::reservations::{ReservationLifecycle, TransitionPolicy};
use crate::store::RentalStore;

/// Every rental service wired against one shared store.
pub struct Rentals<S> {
    pub accounts: Arc<AccountDirectory<S>>,
    pub apartments: Arc<ApartmentRegistry<S>>,
    pub reservations: Arc<ReservationLifecycle<S>>,
    pub notifications: Arc<NotificationCenter<S>>,
    pub messaging: Arc<Messenger<S>>,
    pub dashboard: Arc<Dashboard<S>>,
}

impl<S> Rentals<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>, policy: TransitionPolicy) -> Self {
        Self {
            accounts: Arc::new(AccountDirectory::new(Arc::clone(&store))),
            apartments: Arc::new(ApartmentRegistry::new(Arc::clone(&store))),
            reservations: Arc::new(ReservationLifecycle::new(Arc::clone(&store), policy)),
            notifications: Arc::new(NotificationCenter::new(Arc::clone(&store))),
            messaging: Arc::new(Messenger::new(Arc::clone(&store))),
            dashboard: Arc::new(Dashboard::new(store)),
        }
    }
}

impl<S> Clone for Rentals<S> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            apartments: Arc::clone(&self.apartments),
            reservations: Arc::clone(&self.reservations),
            notifications: Arc::clone(&self.notifications),
            messaging: Arc::clone(&self.messaging),
            dashboard: Arc::clone(&self.dashboard),
        }
    }
}
