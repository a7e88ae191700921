use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted plant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PlantRow {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    pub scientific_name: Option<String>,
    pub title: Option<String>,
    pub brief_description: Option<String>,
    pub content: Option<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A fully resolved record ready for insertion. The store assigns `id` and
/// timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
    pub name: String,
    pub language: String,
    pub slug: String,
    pub title: Option<String>,
    pub scientific_name: Option<String>,
    pub content: Option<String>,
    pub brief_description: Option<String>,
}

/// Body of `POST /plants`.
///
/// `content` and `brief_description` are tri-state: `None` when the key is
/// absent, `Some(None)` for an explicit `null`, `Some(Some(_))` for a value.
/// Only the first case triggers generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePlantRequest {
    pub name: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "scientificName")]
    pub scientific_name: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,
    #[serde(
        default,
        alias = "briefDescription",
        deserialize_with = "double_option"
    )]
    pub brief_description: Option<Option<String>>,
}

/// Output of the validation stage: canonical, conflict-checked, not yet
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftPlant {
    pub name: String,
    pub language: String,
    pub scientific_name: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<Option<String>>,
    pub brief_description: Option<Option<String>>,
}

/// Body of `PUT /plants/:id`. Absent keys are left untouched; nullable
/// columns accept an explicit `null` to clear them. There is no `id` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlantUpdate {
    pub name: Option<String>,
    pub language: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        alias = "scientificName",
        deserialize_with = "double_option"
    )]
    pub scientific_name: Option<Option<String>>,
    #[serde(
        default,
        alias = "briefDescription",
        deserialize_with = "double_option"
    )]
    pub brief_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub content: Option<Option<String>>,
}

impl PlantUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.language.is_none()
            && self.slug.is_none()
            && self.title.is_none()
            && self.scientific_name.is_none()
            && self.brief_description.is_none()
            && self.content.is_none()
    }
}

/// Distinguishes a present-but-null field from a missing one. Paired with
/// `#[serde(default)]`, a missing key stays `None`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
