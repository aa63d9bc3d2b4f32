//! List access resolution.
//!
//! A user reaches a list either as its owner or through a single grant
//! recorded in `list_permissions`. The owner never holds a grant on their own
//! list, so the two paths are mutually exclusive.

use std::{fmt, str::FromStr};

use bitflags::bitflags;
use diesel::result::QueryResult;
use serde::{Deserialize, Serialize};

use crate::{
    db::{DbConnection, get_list, get_permission},
    models::List,
};

bitflags! {
    /// Operations a user may perform on a list.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ListCapabilities: u8 {
        /// Read the list, its items and its event stream.
        const VIEW = 1 << 0;
        /// Add, toggle and remove items.
        const EDIT_ITEMS = 1 << 1;
        /// Grant and revoke access for other users.
        const SHARE = 1 << 2;
        /// Delete the list.
        const DELETE = 1 << 3;
    }
}

impl ListCapabilities {
    /// Capabilities of the list owner.
    #[must_use]
    pub const fn owner() -> Self { Self::all() }

    /// Capabilities conferred by a grant of `level`.
    #[must_use]
    pub const fn for_level(level: PermissionLevel) -> Self {
        match level {
            PermissionLevel::Edit => Self::from_bits_truncate(Self::VIEW.bits() | Self::EDIT_ITEMS.bits()),
            PermissionLevel::View => Self::VIEW,
        }
    }
}

/// Level of a sharing grant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// Read and modify items.
    #[default]
    Edit,
    /// Read only.
    View,
}

impl PermissionLevel {
    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::View => "view",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Error returned when parsing an unknown permission level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission level: {0}")]
pub struct UnknownPermissionLevel(pub String);

impl FromStr for PermissionLevel {
    type Err = UnknownPermissionLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(Self::Edit),
            "view" => Ok(Self::View),
            other => Err(UnknownPermissionLevel(other.to_owned())),
        }
    }
}

/// How a user reaches a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The user owns the list.
    Owner,
    /// The list is shared with the user at the given level.
    Shared(PermissionLevel),
}

impl Access {
    /// Capabilities implied by this access path.
    #[must_use]
    pub const fn capabilities(self) -> ListCapabilities {
        match self {
            Self::Owner => ListCapabilities::owner(),
            Self::Shared(level) => ListCapabilities::for_level(level),
        }
    }

    /// Whether the user owns the list.
    #[must_use]
    pub const fn is_owner(self) -> bool { matches!(self, Self::Owner) }

    /// Whether the user may modify items.
    #[must_use]
    pub const fn can_edit(self) -> bool { self.capabilities().contains(ListCapabilities::EDIT_ITEMS) }

    /// Effective permission level; owners report `edit`.
    #[must_use]
    pub const fn level(self) -> PermissionLevel {
        match self {
            Self::Owner => PermissionLevel::Edit,
            Self::Shared(level) => level,
        }
    }
}

/// Resolve how `user_id` reaches list `list_id`.
///
/// Returns `None` when the list does not exist or the user has no access.
/// Grants holding an unrecognised level are treated as no access.
///
/// # Errors
/// Returns any error produced by the underlying database queries.
#[must_use = "handle the result"]
pub async fn resolve_access(
    conn: &mut DbConnection,
    list_id: i32,
    user_id: i32,
) -> QueryResult<Option<(List, Access)>> {
    let Some(list) = get_list(conn, list_id).await? else {
        return Ok(None);
    };
    if list.owner_id == user_id {
        return Ok(Some((list, Access::Owner)));
    }
    let grant = get_permission(conn, list_id, user_id).await?;
    Ok(grant
        .and_then(|g| g.permission_level.parse::<PermissionLevel>().ok())
        .map(|level| (list, Access::Shared(level))))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_is_empty() {
        assert!(ListCapabilities::default().is_empty());
    }

    #[test]
    fn owner_has_every_capability() {
        let caps = Access::Owner.capabilities();
        assert!(caps.contains(ListCapabilities::SHARE | ListCapabilities::DELETE));
        assert!(Access::Owner.can_edit());
        assert_eq!(Access::Owner.level(), PermissionLevel::Edit);
    }

    #[rstest]
    #[case(PermissionLevel::Edit, true)]
    #[case(PermissionLevel::View, false)]
    fn shared_access_never_shares_or_deletes(#[case] level: PermissionLevel, #[case] edit: bool) {
        let access = Access::Shared(level);
        let caps = access.capabilities();
        assert!(caps.contains(ListCapabilities::VIEW));
        assert_eq!(access.can_edit(), edit);
        assert!(!caps.intersects(ListCapabilities::SHARE | ListCapabilities::DELETE));
        assert!(!access.is_owner());
    }

    #[rstest]
    #[case(ListCapabilities::VIEW, 0)]
    #[case(ListCapabilities::EDIT_ITEMS, 1)]
    #[case(ListCapabilities::SHARE, 2)]
    #[case(ListCapabilities::DELETE, 3)]
    fn capability_bit_position(#[case] flag: ListCapabilities, #[case] bit: u32) {
        assert_eq!(flag.bits(), 1u8 << bit);
    }

    #[rstest]
    #[case("edit", Some(PermissionLevel::Edit))]
    #[case("view", Some(PermissionLevel::View))]
    #[case("admin", None)]
    #[case("EDIT", None)]
    fn parses_permission_level(#[case] raw: &str, #[case] expected: Option<PermissionLevel>) {
        assert_eq!(raw.parse::<PermissionLevel>().ok(), expected);
        if let Some(level) = expected {
            assert_eq!(level.as_str(), raw);
        }
    }
}
