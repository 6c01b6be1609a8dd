//! Database operations for the `source_profiles` table.
//!
//! The unification core reads these rows and writes back only the inferred
//! attribute fields; everything else belongs to the ingestion tooling.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use creatordb_core::{Platform, SourceProfile};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `source_profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SourceProfileRow {
    pub id: i64,
    pub platform: String,
    pub username: String,
    pub display_name: String,
    pub followers: i64,
    pub avatar_url: Option<String>,
    pub profile_url: Option<String>,
    pub language: Option<String>,
    pub region: Option<String>,
    pub tags: Vec<String>,
    pub social_links: Vec<String>,
    pub inferred_country: Option<String>,
    pub inferred_country_source: Option<String>,
    pub inferred_category: Option<String>,
    pub inferred_category_source: Option<String>,
    pub primary_category: Option<String>,
    pub current_game: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SourceProfileRow {
    /// Convert the row into the domain type, parsing stored platform strings.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidPlatform`] if a stored platform value does
    /// not parse.
    pub fn into_profile(self) -> Result<SourceProfile, DbError> {
        let platform = parse_platform(&self.platform)?;
        let inferred_country_source = self
            .inferred_country_source
            .as_deref()
            .map(parse_platform)
            .transpose()?;
        let inferred_category_source = self
            .inferred_category_source
            .as_deref()
            .map(parse_platform)
            .transpose()?;

        Ok(SourceProfile {
            id: self.id,
            platform,
            username: self.username,
            display_name: self.display_name,
            followers: self.followers,
            avatar_url: self.avatar_url,
            profile_url: self.profile_url,
            language: self.language,
            region: self.region,
            tags: self.tags.into_iter().collect::<BTreeSet<_>>(),
            social_links: self.social_links,
            inferred_country: self.inferred_country,
            inferred_country_source,
            inferred_category: self.inferred_category,
            inferred_category_source,
            primary_category: self.primary_category,
            current_game: self.current_game,
        })
    }
}

pub(crate) fn parse_platform(raw: &str) -> Result<Platform, DbError> {
    raw.parse::<Platform>()
        .map_err(|_| DbError::InvalidPlatform(raw.to_string()))
}

const SELECT_COLUMNS: &str = "id, platform, username, display_name, followers, avatar_url, \
     profile_url, language, region, tags, social_links, inferred_country, \
     inferred_country_source, inferred_category, inferred_category_source, \
     primary_category, current_game, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// List all source profiles on the given platforms, highest follower count
/// first. The unification pass relies on this ordering for anchor processing.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn list_profiles_for_platforms(
    pool: &PgPool,
    platforms: &[Platform],
) -> Result<Vec<SourceProfileRow>, DbError> {
    let names: Vec<String> = platforms.iter().map(|p| p.as_str().to_string()).collect();
    let rows = sqlx::query_as::<_, SourceProfileRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM source_profiles \
         WHERE platform = ANY($1) \
         ORDER BY followers DESC, id ASC"
    ))
    .bind(&names)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch a single source profile by id, if it exists.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn get_source_profile(
    pool: &PgPool,
    id: i64,
) -> Result<Option<SourceProfileRow>, DbError> {
    Ok(sqlx::query_as::<_, SourceProfileRow>(&format!(
        "SELECT {SELECT_COLUMNS} FROM source_profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

/// Set the inferred country (and its source platform) on a source profile.
///
/// Priority arbitration happens in the backfill planner; this is a plain
/// targeted write.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn update_inferred_country(
    pool: &PgPool,
    profile_id: i64,
    country: &str,
    source: Platform,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE source_profiles \
         SET inferred_country = $1, inferred_country_source = $2, updated_at = NOW() \
         WHERE id = $3",
    )
    .bind(country)
    .bind(source.as_str())
    .bind(profile_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Set the inferred category (and its source platform) on a source profile.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn update_inferred_category(
    pool: &PgPool,
    profile_id: i64,
    category: &str,
    source: Platform,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE source_profiles \
         SET inferred_category = $1, inferred_category_source = $2, updated_at = NOW() \
         WHERE id = $3",
    )
    .bind(category)
    .bind(source.as_str())
    .bind(profile_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Append tags to a source profile, deduplicating against existing tags.
///
/// # Errors
///
/// Returns [`DbError`] on database query failure.
pub async fn append_profile_tags(
    pool: &PgPool,
    profile_id: i64,
    tags: &[String],
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE source_profiles \
         SET tags = ARRAY(SELECT DISTINCT t FROM unnest(tags || $1) AS t ORDER BY t), \
             updated_at = NOW() \
         WHERE id = $2",
    )
    .bind(tags)
    .bind(profile_id)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(platform: &str) -> SourceProfileRow {
        SourceProfileRow {
            id: 1,
            platform: platform.to_string(),
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            followers: 100,
            avatar_url: None,
            profile_url: None,
            language: None,
            region: None,
            tags: vec!["GAMING".to_string(), "GAMING".to_string()],
            social_links: vec![],
            inferred_country: None,
            inferred_country_source: None,
            inferred_category: None,
            inferred_category_source: None,
            primary_category: None,
            current_game: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn into_profile_parses_platform_and_dedups_tags() {
        let profile = row("twitch").into_profile().unwrap();
        assert_eq!(profile.platform, Platform::Twitch);
        assert_eq!(profile.tags.len(), 1, "tags should dedup, got {profile:?}");
    }

    #[test]
    fn into_profile_rejects_unknown_platform() {
        let result = row("myspace").into_profile();
        assert!(
            matches!(result, Err(DbError::InvalidPlatform(ref p)) if p == "myspace"),
            "expected InvalidPlatform, got {result:?}"
        );
    }
}
