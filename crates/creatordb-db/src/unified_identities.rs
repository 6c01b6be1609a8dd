//! Database operations for `unified_identities` and `unified_identity_platforms`.
//!
//! Fresh passes use the chunked batch insert; incremental passes look up an
//! existing identity by any platform identifier, merge in memory, and apply a
//! targeted update. Slot inserts always use `ON CONFLICT DO NOTHING` so an
//! already-linked slot is never overwritten.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use creatordb_core::{Platform, PlatformSnapshot, UnifiedIdentity};

use crate::source_profiles::parse_platform;
use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `unified_identities` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UnifiedIdentityRow {
    pub id: i64,
    pub public_id: Uuid,
    pub display_name: String,
    pub country: Option<String>,
    pub country_source: Option<String>,
    pub primary_category: Option<String>,
    pub category_source: Option<String>,
    pub tags: Vec<String>,
    pub total_reach: i64,
    pub platform_count: i32,
    pub source_streamer_ids: Vec<i64>,
    pub last_verified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row from the `unified_identity_platforms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdentityPlatformRow {
    pub id: i64,
    pub identity_id: i64,
    pub platform: String,
    pub source_profile_id: i64,
    pub username: String,
    pub display_name: String,
    pub followers: i64,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored identity reassembled from its table rows, with its primary key.
#[derive(Debug, Clone)]
pub struct StoredIdentity {
    pub id: i64,
    pub public_id: Uuid,
    pub identity: UnifiedIdentity,
}

fn assemble_identity(
    row: UnifiedIdentityRow,
    slots: Vec<IdentityPlatformRow>,
) -> Result<StoredIdentity, DbError> {
    let country_source = row
        .country_source
        .as_deref()
        .map(parse_platform)
        .transpose()?;
    let category_source = row
        .category_source
        .as_deref()
        .map(parse_platform)
        .transpose()?;

    let mut platforms = BTreeMap::new();
    for slot in slots {
        let platform = parse_platform(&slot.platform)?;
        platforms.insert(
            platform,
            PlatformSnapshot {
                source_profile_id: slot.source_profile_id,
                username: slot.username,
                display_name: slot.display_name,
                followers: slot.followers,
                avatar_url: slot.avatar_url,
                profile_url: slot.profile_url,
                verified: slot.verified,
            },
        );
    }

    Ok(StoredIdentity {
        id: row.id,
        public_id: row.public_id,
        identity: UnifiedIdentity {
            display_name: row.display_name,
            country: row.country,
            country_source,
            primary_category: row.primary_category,
            category_source,
            tags: row.tags.into_iter().collect::<BTreeSet<_>>(),
            platforms,
            total_reach: row.total_reach,
            platform_count: row.platform_count,
            source_streamer_ids: row.source_streamer_ids.into_iter().collect(),
            last_verified_at: row.last_verified_at,
        },
    })
}

const IDENTITY_COLUMNS: &str = "id, public_id, display_name, country, country_source, \
     primary_category, category_source, tags, total_reach, platform_count, \
     source_streamer_ids, last_verified_at, created_at, updated_at";

const SLOT_COLUMNS: &str = "id, identity_id, platform, source_profile_id, username, \
     display_name, followers, avatar_url, profile_url, verified, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Count stored unified identities. Zero selects fresh-mode writes.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn count_unified_identities(pool: &PgPool) -> Result<i64, DbError> {
    Ok(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM unified_identities")
            .fetch_one(pool)
            .await?,
    )
}

async fn insert_identity_tx(
    tx: &mut Transaction<'_, Postgres>,
    identity: &UnifiedIdentity,
) -> Result<i64, DbError> {
    let tags: Vec<&str> = identity.tags.iter().map(String::as_str).collect();
    let source_ids: Vec<i64> = identity.source_streamer_ids.iter().copied().collect();

    let identity_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO unified_identities \
           (public_id, display_name, country, country_source, primary_category, \
            category_source, tags, total_reach, platform_count, source_streamer_ids, \
            last_verified_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&identity.display_name)
    .bind(identity.country.as_deref())
    .bind(identity.country_source.map(Platform::as_str))
    .bind(identity.primary_category.as_deref())
    .bind(identity.category_source.map(Platform::as_str))
    .bind(&tags)
    .bind(identity.total_reach)
    .bind(identity.platform_count)
    .bind(&source_ids)
    .bind(identity.last_verified_at)
    .fetch_one(&mut **tx)
    .await?;

    for (platform, snapshot) in &identity.platforms {
        insert_slot_tx(tx, identity_id, *platform, snapshot).await?;
    }

    Ok(identity_id)
}

/// Returns the number of rows inserted: zero when the slot (or its platform
/// identifier) is already claimed, one otherwise.
async fn insert_slot_tx(
    tx: &mut Transaction<'_, Postgres>,
    identity_id: i64,
    platform: Platform,
    snapshot: &PlatformSnapshot,
) -> Result<u64, DbError> {
    // Duplicate-key conflicts (either per-identity platform slot or a platform
    // identifier already linked elsewhere) are skipped, not raised.
    let result = sqlx::query(
        "INSERT INTO unified_identity_platforms \
           (identity_id, platform, source_profile_id, username, display_name, \
            followers, avatar_url, profile_url, verified) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT DO NOTHING",
    )
    .bind(identity_id)
    .bind(platform.as_str())
    .bind(snapshot.source_profile_id)
    .bind(&snapshot.username)
    .bind(&snapshot.display_name)
    .bind(snapshot.followers)
    .bind(snapshot.avatar_url.as_deref())
    .bind(snapshot.profile_url.as_deref())
    .bind(snapshot.verified)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Insert a single unified identity with its platform slots.
///
/// Returns the new identity's primary key.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn insert_identity(pool: &PgPool, identity: &UnifiedIdentity) -> Result<i64, DbError> {
    let mut tx = pool.begin().await?;
    let id = insert_identity_tx(&mut tx, identity).await?;
    tx.commit().await?;
    Ok(id)
}

/// Insert all computed identities in chunked transactions (fresh mode).
///
/// Returns the number of identities inserted. Duplicate platform-identifier
/// conflicts inside a chunk are skipped rather than raised; fresh mode assumes
/// no pre-existing collisions.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn insert_identities_batch(
    pool: &PgPool,
    identities: &[UnifiedIdentity],
    chunk_size: usize,
) -> Result<usize, DbError> {
    let mut inserted = 0usize;
    for chunk in identities.chunks(chunk_size.max(1)) {
        let mut tx = pool.begin().await?;
        for identity in chunk {
            insert_identity_tx(&mut tx, identity).await?;
            inserted += 1;
        }
        tx.commit().await?;
    }
    Ok(inserted)
}

/// Find a stored identity sharing any of the given platform identifiers.
///
/// Pairs are checked in order; the first hit wins. Returns the full stored
/// identity including its platform slots.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure, or
/// [`DbError::InvalidPlatform`] if a stored row fails to parse.
pub async fn find_identity_by_platform_ids(
    pool: &PgPool,
    pairs: &[(Platform, i64)],
) -> Result<Option<StoredIdentity>, DbError> {
    for (platform, source_profile_id) in pairs {
        let identity_id = sqlx::query_scalar::<_, i64>(
            "SELECT identity_id FROM unified_identity_platforms \
             WHERE platform = $1 AND source_profile_id = $2",
        )
        .bind(platform.as_str())
        .bind(source_profile_id)
        .fetch_optional(pool)
        .await?;

        if let Some(id) = identity_id {
            let row = sqlx::query_as::<_, UnifiedIdentityRow>(&format!(
                "SELECT {IDENTITY_COLUMNS} FROM unified_identities WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(DbError::NotFound)?;

            let slots = sqlx::query_as::<_, IdentityPlatformRow>(&format!(
                "SELECT {SLOT_COLUMNS} FROM unified_identity_platforms \
                 WHERE identity_id = $1 ORDER BY platform"
            ))
            .bind(id)
            .fetch_all(pool)
            .await?;

            return assemble_identity(row, slots).map(Some);
        }
    }
    Ok(None)
}

/// Totals recomputed from the slot rows actually present on an identity.
struct SlotTotals {
    total_reach: i64,
    platform_count: i32,
    source_profile_ids: Vec<i64>,
}

impl SlotTotals {
    fn from_rows(rows: &[(i64, i64)]) -> Self {
        let total_reach = rows.iter().map(|(_, followers)| *followers).sum();
        let mut source_profile_ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
        source_profile_ids.sort_unstable();
        Self {
            total_reach,
            platform_count: i32::try_from(rows.len()).unwrap_or(i32::MAX),
            source_profile_ids,
        }
    }
}

/// Apply a merged identity back to the store.
///
/// Updates the identity row with the merged attribute values, inserts any
/// newly-filled platform slots, then writes totals recomputed from the slot
/// rows present after the inserts. A slot whose platform identifier is
/// already claimed by another identity is skipped, so the in-memory totals
/// can overcount; the stored totals always match the stored slots.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn update_merged_identity(
    pool: &PgPool,
    id: i64,
    identity: &UnifiedIdentity,
) -> Result<(), DbError> {
    let tags: Vec<&str> = identity.tags.iter().map(String::as_str).collect();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE unified_identities SET \
           display_name = $1, country = $2, country_source = $3, \
           primary_category = $4, category_source = $5, tags = $6, \
           last_verified_at = $7, updated_at = NOW() \
         WHERE id = $8",
    )
    .bind(&identity.display_name)
    .bind(identity.country.as_deref())
    .bind(identity.country_source.map(Platform::as_str))
    .bind(identity.primary_category.as_deref())
    .bind(identity.category_source.map(Platform::as_str))
    .bind(&tags)
    .bind(identity.last_verified_at)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    for (platform, snapshot) in &identity.platforms {
        let inserted = insert_slot_tx(&mut tx, id, *platform, snapshot).await?;
        if inserted == 0 {
            tracing::warn!(
                identity_id = id,
                platform = platform.as_str(),
                source_profile_id = snapshot.source_profile_id,
                "platform slot already linked; not counted toward totals"
            );
        }
    }

    let slot_rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT source_profile_id, followers FROM unified_identity_platforms \
         WHERE identity_id = $1",
    )
    .bind(id)
    .fetch_all(&mut *tx)
    .await?;
    let totals = SlotTotals::from_rows(&slot_rows);

    sqlx::query(
        "UPDATE unified_identities SET \
           total_reach = $1, platform_count = $2, source_streamer_ids = $3 \
         WHERE id = $4",
    )
    .bind(totals.total_reach)
    .bind(totals.platform_count)
    .bind(&totals.source_profile_ids)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
