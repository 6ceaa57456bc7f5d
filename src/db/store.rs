use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    app::{AppToggle, ClubApp},
    club::{ClubMembership, NewClub, ProvisionedClub},
    usage::ClubUsage,
};

/// Tenant records: clubs, memberships, app entitlements and platform admins.
///
/// Every method is a single round trip (or a single transaction); nothing is
/// cached between calls.
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;

    async fn is_super_admin(&self, user_id: Uuid) -> anyhow::Result<bool>;

    /// The caller's membership in `club_id`, only if it is active.
    async fn active_membership(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ClubMembership>>;

    /// Creates the club, records the owner under their auth-provider ID and
    /// adds the owning membership, as one atomic unit.
    async fn provision_club(
        &self,
        new_club: &NewClub,
        owner_id: Uuid,
    ) -> anyhow::Result<ProvisionedClub>;

    /// Creates or updates the (club, app) entitlement row.
    async fn upsert_app(&self, toggle: &AppToggle) -> anyhow::Result<ClubApp>;

    async fn club_usage(&self, club_id: Uuid) -> anyhow::Result<ClubUsage>;

    async fn club_for_bucket(&self, bucket: &str) -> anyhow::Result<Option<Uuid>>;

    /// Starts attributing objects stored in `bucket` to the club's usage counters.
    async fn track_bucket(&self, bucket: &str, club_id: Uuid) -> anyhow::Result<()>;
}
