//! Prodigy (athlete profile) records, drafts and validation.
//!
//! Three shapes exist for one prodigy:
//!
//! - [`ProdigeRecord`]: what the backend returns, every field optional and
//!   enumerations as numeric codes.
//! - [`Prodige`]: the normalized display record held by the client.
//! - [`ProdigeDraft`]: caller input for create / update, validated before it
//!   is turned into a [`ProdigePayload`] and sent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::codes::{is_known_country, Gender, Language, Sport, TraitTag};
use crate::error::CoreError;
use crate::normalize::{text_or_empty, ListEntity, NormalizeDefaults};
use crate::types::{EntityId, Timestamp, UserId};

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Minimum number of trait tags on a profile.
pub const MIN_TAGS: usize = 3;

/// Maximum number of trait tags on a profile.
pub const MAX_TAGS: usize = 10;

/// Maximum length of the free-text description.
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;

pub const MIN_AGE: u8 = 5;
pub const MAX_AGE: u8 = 40;

/* --------------------------------------------------------------------------
Wire model
-------------------------------------------------------------------------- */

/// A prodigy as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProdigeRecord {
    pub id: EntityId,
    pub user_id: Option<UserId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<u8>,
    pub sport: Option<u8>,
    pub description: Option<String>,
    pub tags: Option<Vec<u8>>,
    pub country: Option<String>,
    pub gender: Option<u8>,
    pub created_at: Option<Timestamp>,
    pub modified_at: Option<Timestamp>,
    pub created_by: Option<UserId>,
    pub modified_by: Option<UserId>,
}

/// Body of a create / update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProdigePayload {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub sport: u8,
    pub description: String,
    pub tags: Vec<u8>,
    pub country: String,
    pub gender: u8,
}

/* --------------------------------------------------------------------------
Display model
-------------------------------------------------------------------------- */

/// A normalized prodigy profile.
///
/// Audit fields are only ever written by normalization and are exposed
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prodige {
    pub id: EntityId,
    pub owner_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u8>,
    pub sport: Option<Sport>,
    pub description: String,
    pub tags: Vec<TraitTag>,
    pub country: String,
    pub gender: Option<Gender>,
    created_at: Timestamp,
    modified_at: Timestamp,
    created_by: UserId,
    modified_by: UserId,
}

impl Prodige {
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn modified_at(&self) -> Timestamp {
        self.modified_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn modified_by(&self) -> &str {
        &self.modified_by
    }

    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => String::new(),
        }
    }

    /// Tag labels in the given language, in profile order.
    pub fn display_tags(&self, lang: Language) -> Vec<&'static str> {
        self.tags.iter().map(|t| t.label(lang)).collect()
    }

    /// Pre-fill an edit form. `None` when sport, gender or age were never set.
    pub fn to_draft(&self) -> Option<ProdigeDraft> {
        Some(ProdigeDraft {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age?,
            sport: self.sport?,
            description: self.description.clone(),
            tags: self.tags.clone(),
            country: self.country.clone(),
            gender: self.gender?,
        })
    }
}

/// Normalize a backend record into a complete [`Prodige`].
///
/// - unknown sport / gender / tag codes are dropped
/// - missing tags become an empty list, duplicates are removed
/// - missing or unsupported country falls back to the default country
/// - missing `createdAt` is stamped with the commit time, missing
///   `modifiedAt` with `createdAt`
/// - missing `createdBy` / `modifiedBy` fall back to the owner
pub fn normalize_prodige(record: ProdigeRecord, defaults: &NormalizeDefaults) -> Prodige {
    let owner_id = record.user_id.unwrap_or_default();

    let mut seen = HashSet::new();
    let tags = record
        .tags
        .unwrap_or_default()
        .into_iter()
        .filter_map(TraitTag::from_code)
        .filter(|t| seen.insert(*t))
        .collect();

    let country = record
        .country
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| is_known_country(c))
        .unwrap_or_else(|| defaults.default_country.clone());

    let created_at = record.created_at.unwrap_or(defaults.now);
    let modified_at = record.modified_at.unwrap_or(created_at);
    let created_by = record.created_by.unwrap_or_else(|| owner_id.clone());
    let modified_by = record.modified_by.unwrap_or_else(|| created_by.clone());

    Prodige {
        id: record.id,
        owner_id,
        first_name: text_or_empty(record.first_name),
        last_name: text_or_empty(record.last_name),
        age: record.age,
        sport: record.sport.and_then(Sport::from_code),
        description: text_or_empty(record.description),
        tags,
        country,
        gender: record.gender.and_then(Gender::from_code),
        created_at,
        modified_at,
        created_by,
        modified_by,
    }
}

impl ListEntity for Prodige {
    type Record = ProdigeRecord;

    const ENTITY: &'static str = "prodige";

    fn id(&self) -> &str {
        &self.id
    }

    fn record_id(record: &ProdigeRecord) -> &str {
        &record.id
    }

    fn normalize(record: ProdigeRecord, defaults: &NormalizeDefaults) -> Self {
        normalize_prodige(record, defaults)
    }
}

/* --------------------------------------------------------------------------
Draft + validation
-------------------------------------------------------------------------- */

/// Caller input for creating or updating a prodigy.
#[derive(Debug, Clone, PartialEq, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProdigeDraft {
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub last_name: String,
    #[validate(range(min = 5, max = 40, message = "must be between 5 and 40"))]
    pub age: u8,
    pub sport: Sport,
    #[validate(length(max = 2000, message = "must be at most 2000 characters"))]
    pub description: String,
    #[validate(length(min = 3, max = 10, message = "must contain between 3 and 10 tags"))]
    pub tags: Vec<TraitTag>,
    pub country: String,
    pub gender: Gender,
}

impl ProdigeDraft {
    /// Check every field. Nothing may be sent to the backend unless this passes.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;

        if self.first_name.trim().is_empty() {
            return Err(CoreError::Validation("first_name must not be blank".into()));
        }
        if self.last_name.trim().is_empty() {
            return Err(CoreError::Validation("last_name must not be blank".into()));
        }

        validate_tags(&self.tags)?;

        if !is_known_country(&self.country) {
            return Err(CoreError::Validation(format!(
                "Unknown country code '{}'",
                self.country
            )));
        }

        Ok(())
    }

    /// Validate, then translate into the wire payload owned by `owner`.
    pub fn into_payload(self, owner: &str) -> Result<ProdigePayload, CoreError> {
        self.check()?;
        Ok(ProdigePayload {
            user_id: owner.to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            age: self.age,
            sport: self.sport.code(),
            description: self.description.trim().to_string(),
            tags: self.tags.iter().map(|t| t.code()).collect(),
            country: self.country,
            gender: self.gender.code(),
        })
    }
}

/// Validate a tag list: between [`MIN_TAGS`] and [`MAX_TAGS`], no duplicates.
pub fn validate_tags(tags: &[TraitTag]) -> Result<(), CoreError> {
    if !(MIN_TAGS..=MAX_TAGS).contains(&tags.len()) {
        return Err(CoreError::Validation(format!(
            "A prodigy must have between {MIN_TAGS} and {MAX_TAGS} tags (got {})",
            tags.len()
        )));
    }

    let unique: HashSet<_> = tags.iter().collect();
    if unique.len() != tags.len() {
        return Err(CoreError::Validation("Tags must not repeat".to_string()));
    }

    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
