//! ActorRole enum for attributing portal actions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of the actor behind a portal action.
///
/// `Admin` is the privileged role: admin activity is surfaced to the
/// client's contact, while client activity is surfaced to the admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Client,
}

impl ActorRole {
    /// Returns true for the privileged/administrative role.
    pub fn is_admin(&self) -> bool {
        matches!(self, ActorRole::Admin)
    }

    /// Returns the stable storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Admin => "admin",
            ActorRole::Client => "client",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorRole::Admin => "Admin",
            ActorRole::Client => "Client",
        };
        write!(f, "{}", s)
    }
}
