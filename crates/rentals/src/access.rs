//! Role and ownership checks for every lifecycle entry point.
//!
//! Services call [`authorize`] once, before touching any state, instead of sprinkling
//! `is_staff` comparisons through each operation.

use serde::{Deserialize, Serialize};

use crate::accounts::{UserAccount, UserId};
use crate::error::ServiceError;
use crate::reservations::ReservationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tenant,
    Staff,
}

/// Authenticated caller as supplied by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl Actor {
    pub fn from_account(account: &UserAccount) -> Self {
        Self {
            user_id: account.id,
            username: account.username.clone(),
            role: if account.is_staff {
                Role::Staff
            } else {
                Role::Tenant
            },
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    pub fn can(&self, capability: Capability) -> bool {
        check(self, capability).is_ok()
    }
}

/// Actions guarded by role or ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageApartments,
    ReviewReservations,
    AutoApprove,
    ViewAllReservations,
    ViewAdminDashboard,
    MessageAnyUser,
    ViewReservation { owner: UserId },
    ModifyReservation { owner: UserId, status: ReservationStatus },
    CancelReservation { owner: UserId },
}

pub fn authorize(actor: &Actor, capability: Capability) -> Result<(), ServiceError> {
    check(actor, capability).map_err(|reason| {
        tracing::debug!(actor = %actor.username, ?capability, reason, "authorization denied");
        ServiceError::permission(reason)
    })
}

fn check(actor: &Actor, capability: Capability) -> Result<(), &'static str> {
    if actor.is_staff() {
        return Ok(());
    }

    match capability {
        Capability::ManageApartments => Err("Only admins can manage apartments."),
        Capability::ReviewReservations => Err("Only admins can review reservations."),
        Capability::AutoApprove => Err("Only admins can auto-approve reservations."),
        Capability::ViewAllReservations => Err("Only admins can view all reservations."),
        Capability::ViewAdminDashboard => Err("Access denied. Admin only."),
        Capability::MessageAnyUser => Err("Tenants can only message staff."),
        Capability::ViewReservation { owner } | Capability::CancelReservation { owner } => {
            if owner == actor.user_id {
                Ok(())
            } else {
                Err("You can only manage your own reservations.")
            }
        }
        Capability::ModifyReservation { owner, status } => {
            if owner != actor.user_id {
                Err("You can only edit your own reservations.")
            } else if status != ReservationStatus::Pending {
                Err("You can only edit pending reservations.")
            } else {
                Ok(())
            }
        }
    }
}
