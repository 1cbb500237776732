use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    NewAccount, RegisteredTenant, TenantProfile, TenantRegistration, UserAccount, UserId,
};
use crate::access::{Actor, Capability};
use crate::error::ServiceError;
use crate::store::{RentalStore, RepositoryError};

/// Directory of user identities known to the rental workflows.
pub struct AccountDirectory<S> {
    store: Arc<S>,
}

impl<S> AccountDirectory<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a tenant account and its profile together.
    pub fn register_tenant(
        &self,
        registration: TenantRegistration,
    ) -> Result<RegisteredTenant, ServiceError> {
        registration.validate()?;

        let registered = self.store.transaction(|tx| {
            let account = tx.insert_user(NewAccount {
                username: registration.username.trim().to_string(),
                full_name: registration.full_name.trim().to_string(),
                email: registration.email.trim().to_string(),
                is_staff: false,
                joined_at: Utc::now(),
            })?;
            let profile = TenantProfile {
                user_id: account.id,
                phone: registration.phone.trim().to_string(),
                address: registration.address.trim().to_string(),
                emergency_contact: registration.emergency_contact.trim().to_string(),
                emergency_phone: registration.emergency_phone.trim().to_string(),
                id_number: registration.id_number.trim().to_string(),
            };
            tx.insert_tenant_profile(profile.clone())?;
            Ok::<_, ServiceError>(RegisteredTenant { account, profile })
        })?;

        info!(user = %registered.account.id, username = %registered.account.username, "tenant registered");
        Ok(registered)
    }

    /// Ensures a staff identity exists; an existing staff account is returned unchanged.
    pub fn provision_staff(
        &self,
        username: &str,
        full_name: &str,
    ) -> Result<UserAccount, ServiceError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ServiceError::validation("username is required"));
        }

        self.store.transaction(|tx| {
            if let Some(existing) = tx.user_by_username(username)? {
                if existing.is_staff {
                    return Ok(existing);
                }
                return Err(RepositoryError::Conflict(format!(
                    "non-staff account '{username}'"
                ))
                .into());
            }

            let account = tx.insert_user(NewAccount {
                username: username.to_string(),
                full_name: full_name.trim().to_string(),
                email: String::new(),
                is_staff: true,
                joined_at: Utc::now(),
            })?;
            info!(user = %account.id, username = %account.username, "staff account provisioned");
            Ok(account)
        })
    }

    pub fn get(&self, id: UserId) -> Result<UserAccount, ServiceError> {
        self.store
            .read(|tx| tx.user(id))?
            .ok_or_else(|| ServiceError::not_found(format!("user {id} not found")))
    }

    pub fn profile(&self, id: UserId) -> Result<Option<TenantProfile>, ServiceError> {
        Ok(self.store.read(|tx| tx.tenant_profile(id))?)
    }

    /// Turns an authenticated user id into an [`Actor`].
    pub fn resolve(&self, id: UserId) -> Result<Actor, ServiceError> {
        self.get(id).map(|account| Actor::from_account(&account))
    }

    /// Users the actor may start a conversation with: staff reach everyone, tenants reach staff.
    pub fn recipients(&self, actor: &Actor) -> Result<Vec<UserAccount>, ServiceError> {
        let everyone = actor.can(Capability::MessageAnyUser);
        let users = self.store.read(|tx| tx.users())?;
        Ok(users
            .into_iter()
            .filter(|user| user.id != actor.user_id)
            .filter(|user| everyone || user.is_staff)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{registration, Fixture};

    #[test]
    fn registers_tenant_with_profile() {
        let fixture = Fixture::new();
        let registered = fixture
            .rentals
            .accounts
            .register_tenant(registration("ana", "PH-0001"))
            .expect("registration succeeds");

        assert!(!registered.account.is_staff);
        let profile = fixture
            .rentals
            .accounts
            .profile(registered.account.id)
            .expect("profile lookup")
            .expect("profile present");
        assert_eq!(profile.id_number, "PH-0001");
    }

    #[test]
    fn duplicate_id_numbers_conflict_without_leaving_an_account() {
        let fixture = Fixture::new();
        fixture
            .rentals
            .accounts
            .register_tenant(registration("ana", "PH-0001"))
            .expect("first registration");

        match fixture
            .rentals
            .accounts
            .register_tenant(registration("ben", "PH-0001"))
        {
            Err(ServiceError::Repository(RepositoryError::Conflict(message))) => {
                assert!(message.contains("PH-0001"))
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        let users = fixture
            .store
            .transaction(|tx| tx.users())
            .expect("list users");
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let fixture = Fixture::new();
        let mut bad = registration("ana", "PH-0001");
        bad.email = "  ".to_string();
        assert!(matches!(
            fixture.rentals.accounts.register_tenant(bad),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn provisioning_staff_is_idempotent() {
        let fixture = Fixture::new();
        let first = fixture
            .rentals
            .accounts
            .provision_staff("admin", "Site Admin")
            .expect("provision");
        let second = fixture
            .rentals
            .accounts
            .provision_staff("admin", "Another Name")
            .expect("provision again");
        assert_eq!(first, second);
        assert!(fixture
            .rentals
            .accounts
            .resolve(first.id)
            .expect("resolve")
            .is_staff());
    }

    #[test]
    fn tenants_may_only_message_staff() {
        let fixture = Fixture::new();
        let admin = fixture
            .rentals
            .accounts
            .provision_staff("admin", "Site Admin")
            .expect("provision");
        let ana = fixture
            .rentals
            .accounts
            .register_tenant(registration("ana", "PH-0001"))
            .expect("register ana")
            .account;
        let ben = fixture
            .rentals
            .accounts
            .register_tenant(registration("ben", "PH-0002"))
            .expect("register ben")
            .account;

        let tenant_view = fixture
            .rentals
            .accounts
            .recipients(&Actor::from_account(&ana))
            .expect("recipients");
        assert_eq!(tenant_view, vec![admin.clone()]);

        let staff_view = fixture
            .rentals
            .accounts
            .recipients(&Actor::from_account(&admin))
            .expect("recipients");
        assert_eq!(staff_view, vec![ana, ben]);
    }

    #[test]
    fn resolving_unknown_users_is_not_found() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture.rentals.accounts.resolve(UserId(42)),
            Err(ServiceError::NotFound(_))
        ));
    }
}
