//! Users and their sponsor links

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::impl_domain_status_conversions;

/// Position of a user in the organisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Leader,
    Agent,
}

impl_domain_status_conversions!(UserRole {
    Owner => "owner",
    Leader => "leader",
    Agent => "agent",
});

/// A member of the sponsor hierarchy
///
/// `sponsor_id` points one level up. Owners have none. A non-owner without a
/// sponsor is an orphan; the hierarchy view attaches it to the first owner
/// but the stored record is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor_id: Option<String>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
        sponsor_id: Option<String>,
    ) -> Self {
        Self { id: id.into(), name: name.into(), role, sponsor_id }
    }

    pub fn is_owner(&self) -> bool {
        self.role == UserRole::Owner
    }

    /// Non-owner with no stored sponsor
    pub fn is_orphan(&self) -> bool {
        !self.is_owner() && self.sponsor_id.is_none()
    }
}
