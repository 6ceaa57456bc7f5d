use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::store::TenantStore;
use crate::models::{
    app::{AppToggle, ClubApp},
    bucket::club_bucket_name,
    club::{unique_slug, ClubMembership, ClubRole, NewClub, ProvisionedClub},
    usage::{AppUsage, ClubUsage, StorageUsage},
};

#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn is_super_admin(&self, user_id: Uuid) -> anyhow::Result<bool> {
        let flag: Option<bool> =
            sqlx::query_scalar("SELECT is_super_admin FROM admin_users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(flag.unwrap_or(false))
    }

    async fn active_membership(
        &self,
        club_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ClubMembership>> {
        let membership = sqlx::query_as::<_, ClubMembership>(
            "SELECT club_id, user_id, role, is_active
             FROM club_members
             WHERE club_id = $1 AND user_id = $2 AND is_active = TRUE",
        )
        .bind(club_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(membership)
    }

    async fn provision_club(
        &self,
        new_club: &NewClub,
        owner_id: Uuid,
    ) -> anyhow::Result<ProvisionedClub> {
        let mut tx = self.pool.begin().await?;

        // Serialises provisions that start from the same slug until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&new_club.base_slug)
            .execute(&mut *tx)
            .await?;

        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT slug FROM clubs WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(&new_club.base_slug)
        .fetch_all(&mut *tx)
        .await?;
        let slug = unique_slug(&new_club.base_slug, &taken);
        let storage_bucket = club_bucket_name(&new_club.bucket_prefix, &slug);

        let club_id: Uuid = sqlx::query_scalar(
            "INSERT INTO clubs (name, slug, subscription_status, storage_bucket)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&new_club.name)
        .bind(&slug)
        .bind(new_club.subscription_status)
        .bind(&storage_bucket)
        .fetch_one(&mut *tx)
        .await?;

        // users.id is the auth provider's ID, so the owner's tokens match it
        sqlx::query(
            "INSERT INTO users (id, email) VALUES ($1, LOWER($2))
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email",
        )
        .bind(owner_id)
        .bind(&new_club.owner_email)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO club_members (club_id, user_id, role, is_active)
             VALUES ($1, $2, $3, TRUE)",
        )
        .bind(club_id)
        .bind(owner_id)
        .bind(ClubRole::Owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ProvisionedClub {
            club_id,
            owner_id,
            slug,
            storage_bucket,
        })
    }

    async fn upsert_app(&self, toggle: &AppToggle) -> anyhow::Result<ClubApp> {
        let settings = Json(Value::Object(toggle.settings.clone()));

        // updated_at only moves when the row actually changes, so repeating
        // a toggle leaves the record untouched.
        let app = sqlx::query_as::<_, ClubApp>(
            "INSERT INTO club_apps (club_id, app_type, is_enabled, settings)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (club_id, app_type) DO UPDATE SET
               is_enabled = EXCLUDED.is_enabled,
               settings   = club_apps.settings || EXCLUDED.settings,
               updated_at = CASE
                   WHEN club_apps.is_enabled = EXCLUDED.is_enabled
                    AND club_apps.settings || EXCLUDED.settings = club_apps.settings
                   THEN club_apps.updated_at
                   ELSE NOW()
               END
             RETURNING id, club_id, app_type, is_enabled, settings, created_at, updated_at",
        )
        .bind(toggle.club_id)
        .bind(toggle.app_type)
        .bind(toggle.enabled)
        .bind(settings)
        .fetch_one(&self.pool)
        .await?;
        Ok(app)
    }

    async fn club_usage(&self, club_id: Uuid) -> anyhow::Result<ClubUsage> {
        let (files, size_bytes, total, enabled): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT
               COALESCE((SELECT file_count FROM club_storage_usage WHERE club_id = $1), 0),
               COALESCE((SELECT size_bytes FROM club_storage_usage WHERE club_id = $1), 0),
               (SELECT COUNT(*) FROM club_apps WHERE club_id = $1),
               (SELECT COUNT(*) FROM club_apps WHERE club_id = $1 AND is_enabled)",
        )
        .bind(club_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ClubUsage {
            storage: StorageUsage { files, size_bytes },
            apps: AppUsage { total, enabled },
        })
    }

    async fn club_for_bucket(&self, bucket: &str) -> anyhow::Result<Option<Uuid>> {
        let club_id = sqlx::query_scalar("SELECT id FROM clubs WHERE storage_bucket = $1")
            .bind(bucket)
            .fetch_optional(&self.pool)
            .await?;
        Ok(club_id)
    }

    async fn track_bucket(&self, bucket: &str, club_id: Uuid) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO tracked_buckets (bucket_name, club_id) VALUES ($1, $2)
             ON CONFLICT (bucket_name) DO UPDATE SET club_id = EXCLUDED.club_id",
        )
        .bind(bucket)
        .bind(club_id)
        .execute(&mut *tx)
        .await?;

        let has_objects: bool =
            sqlx::query_scalar("SELECT to_regclass('storage.objects') IS NOT NULL")
                .fetch_one(&mut *tx)
                .await?;

        // Backfill from objects stored before tracking started
        if has_objects {
            sqlx::query(
                "INSERT INTO club_storage_usage (club_id, file_count, size_bytes)
                 SELECT $2, COUNT(*), COALESCE(SUM((metadata->>'size')::BIGINT), 0)::BIGINT
                 FROM storage.objects WHERE bucket_id = $1
                 ON CONFLICT (club_id) DO UPDATE SET
                   file_count = EXCLUDED.file_count,
                   size_bytes = EXCLUDED.size_bytes,
                   updated_at = NOW()",
            )
            .bind(bucket)
            .bind(club_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
