//! Store-owned records.
//!
//! [`Lounge`] rows come back from the store's RPC functions already joined
//! with the viewer's membership flag and the member count. [`Membership`] is
//! the row shape written to and deleted from the `memberships` table.

use serde::{Deserialize, Serialize};

use crate::{LoungeId, UserId};

/// A community lounge as seen by the current viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lounge {
    /// Primary key.
    pub id: LoungeId,
    /// URL-safe unique name used by the detail page.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image reference (URL).
    pub image_url: String,
    /// Number of memberships at read time.
    #[serde(default)]
    pub member_count: u64,
    /// Whether the viewer is a member. Always `false` for anonymous viewers.
    #[serde(default)]
    pub is_member: bool,
}

/// One row of the `memberships` table.
///
/// At most one row exists per `(user_id, lounge_id)` pair; the store enforces
/// this with a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    /// Member.
    pub user_id: UserId,
    /// Lounge joined.
    pub lounge_id: LoungeId,
}

impl Membership {
    /// Pair a user with a lounge.
    pub const fn new(user_id: UserId, lounge_id: LoungeId) -> Self {
        Self { user_id, lounge_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_row_decodes_with_missing_optional_columns() {
        let row = r#"{
            "id": "0b7e3c1a-2222-4e5f-8a9b-112233445566",
            "slug": "rustaceans",
            "title": "Rustaceans",
            "image_url": "https://img.example/rust.png"
        }"#;

        let lounge: Lounge = serde_json::from_str(row).unwrap();
        assert_eq!(lounge.slug, "rustaceans");
        assert_eq!(lounge.description, None);
        assert_eq!(lounge.member_count, 0);
        assert!(!lounge.is_member);
    }

    #[test]
    fn negative_member_count_is_rejected() {
        let row = r#"{
            "id": "0b7e3c1a-2222-4e5f-8a9b-112233445566",
            "slug": "s",
            "title": "t",
            "image_url": "u",
            "member_count": -1
        }"#;

        assert!(serde_json::from_str::<Lounge>(row).is_err());
    }

    #[test]
    fn membership_body_uses_column_names() {
        let membership = Membership::new(
            "11111111-1111-4111-8111-111111111111".parse().unwrap(),
            "22222222-2222-4222-8222-222222222222".parse().unwrap(),
        );

        let json = serde_json::to_value(membership).unwrap();
        assert_eq!(json["user_id"], "11111111-1111-4111-8111-111111111111");
        assert_eq!(json["lounge_id"], "22222222-2222-4222-8222-222222222222");
    }
}
