use tracing::{info, warn};

use crate::{
    db::TenantStore,
    error::ApiError,
    models::{
        bucket::BucketSpec,
        club::{slugify, NewClub, ProvisionClubRequest, ProvisionClubResponse, SubscriptionStatus},
    },
    services::{
        buckets::BucketProvisioner,
        directory::OwnerDirectory,
        metrics::{PROVISIONS_COUNTER, SIDE_EFFECT_WARNINGS_COUNTER},
    },
};

const OPERATION: &str = "provision-club";

/// Loose syntactic check: exactly one `@`, a non-empty local part, a dotted
/// domain and no whitespace.
pub fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

pub struct ProvisioningService;

impl ProvisioningService {
    pub fn validate(body: &ProvisionClubRequest, bucket_prefix: &str) -> Result<NewClub, ApiError> {
        let name = body.club_name.as_deref().map(str::trim).unwrap_or_default();
        let email = body.owner_email.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() || email.is_empty() {
            return Err(ApiError::Validation(
                "Club name and owner email are required".to_string(),
            ));
        }
        if !is_valid_email(email) {
            return Err(ApiError::Validation(format!("Invalid owner email: {email}")));
        }

        let subscription_status = match body.subscription_status.as_deref() {
            None => SubscriptionStatus::default(),
            Some(s) => s
                .parse()
                .map_err(|_| ApiError::Validation(format!("Invalid subscription status: {s}")))?,
        };

        Ok(NewClub {
            name: name.to_string(),
            base_slug: slugify(name),
            owner_email: email.to_lowercase(),
            subscription_status,
            bucket_prefix: bucket_prefix.to_string(),
        })
    }

    /// Resolves the owner's account, creates the club atomically, then
    /// ensures its bucket. Only the first two steps can fail the call; bucket
    /// and tracking problems come back as warnings.
    pub async fn provision(
        tenants: &dyn TenantStore,
        owners: &dyn OwnerDirectory,
        buckets: &BucketProvisioner,
        new_club: &NewClub,
    ) -> Result<ProvisionClubResponse, ApiError> {
        let owner_id = owners.ensure_user(&new_club.owner_email).await.map_err(|e| {
            PROVISIONS_COUNTER.with_label_values(&["failure"]).inc();
            ApiError::backend("Failed to provision club", e)
        })?;

        let club = tenants.provision_club(new_club, owner_id).await.map_err(|e| {
            PROVISIONS_COUNTER.with_label_values(&["failure"]).inc();
            ApiError::backend("Failed to provision club", e)
        })?;
        PROVISIONS_COUNTER.with_label_values(&["success"]).inc();
        info!(club_id = %club.club_id, slug = %club.slug, "club provisioned");

        let mut warnings = Vec::new();
        match buckets.ensure(&BucketSpec::tenant(&club.storage_bucket)).await {
            Ok(_) => {
                if let Some(w) = BucketProvisioner::track_usage(
                    tenants,
                    OPERATION,
                    &club.storage_bucket,
                    club.club_id,
                )
                .await
                {
                    warnings.push(w);
                }
            }
            Err(e) => {
                warn!(club_id = %club.club_id, bucket = %club.storage_bucket, "storage bucket creation failed: {e}");
                SIDE_EFFECT_WARNINGS_COUNTER.with_label_values(&[OPERATION]).inc();
                warnings.push(format!(
                    "Storage bucket {} was not created: {e}",
                    club.storage_bucket
                ));
            }
        }

        Ok(ProvisionClubResponse {
            success: true,
            club_id: club.club_id,
            owner_id: club.owner_id,
            message: "Club provisioned successfully".to_string(),
            warnings,
        })
    }
}
