//! Plant synthesis: orchestrates the full record-creation pipeline.
//!
//! Flow: validate_new_plant → title → slug → content → brief description →
//!       insert.
//!
//! Every AI-derived field degrades to null on failure; only structural
//! failures (no usable slug, store errors, conflicts) abort the request.

use std::fmt;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::plants::generators::FieldGenerators;
use crate::plants::models::{non_blank, CreatePlantRequest, DraftPlant, NewPlant, PlantRow};
use crate::plants::slug::{is_valid_slug, slugify};
use crate::plants::store::{PlantStore, StoreError};
use crate::plants::validation::validate_new_plant;

/// Where the final slug came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlugSource {
    Supplied,
    Title,
    Name,
}

impl fmt::Display for SlugSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlugSource::Supplied => "supplied slug",
            SlugSource::Title => "title",
            SlugSource::Name => "plant name",
        })
    }
}

/// Returns the first candidate whose normalised slug is usable.
///
/// Candidates are tried lazily in order; `None` means every candidate
/// normalised to an empty string.
pub fn first_usable_slug<'a>(
    candidates: impl IntoIterator<Item = (SlugSource, Option<&'a str>)>,
) -> Option<(SlugSource, String)> {
    candidates.into_iter().find_map(|(source, text)| {
        let slug = slugify(non_blank(text)?);
        is_valid_slug(&slug).then_some((source, slug))
    })
}

/// Drives a create request from raw input to a persisted record.
pub struct PlantSynthesizer<'a> {
    generators: &'a FieldGenerators,
    store: &'a dyn PlantStore,
}

impl<'a> PlantSynthesizer<'a> {
    pub fn new(generators: &'a FieldGenerators, store: &'a dyn PlantStore) -> Self {
        Self { generators, store }
    }

    /// Runs validation then synthesis.
    pub async fn create(&self, request: CreatePlantRequest) -> Result<PlantRow, AppError> {
        let draft = validate_new_plant(self.generators, self.store, request).await?;
        self.synthesize(draft).await
    }

    /// Resolves the remaining fields of an accepted draft and inserts it.
    pub async fn synthesize(&self, draft: DraftPlant) -> Result<PlantRow, AppError> {
        let DraftPlant {
            name,
            language,
            scientific_name,
            title,
            slug,
            content,
            brief_description,
        } = draft;
        let supplied_slug = non_blank(slug.as_deref());

        // Step 1: title
        let title = match non_blank(title.as_deref()) {
            Some(title) => Some(title.to_string()),
            None if supplied_slug.is_some() => {
                info!("Slug supplied for {name:?}; skipping title generation");
                None
            }
            None => self.generators.seo_title(&name, &language).await,
        };

        // Step 2: slug
        let (slug_source, slug) = first_usable_slug([
            (SlugSource::Supplied, supplied_slug),
            (SlugSource::Title, title.as_deref()),
            (SlugSource::Name, Some(name.as_str())),
        ])
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Could not determine a valid slug for plant '{name}'"
            ))
        })?;
        if slug_source == SlugSource::Name {
            warn!("Slug for {name:?} derived from the plant name as a fallback: {slug:?}");
        } else {
            info!("Slug for {name:?} derived from {slug_source}: {slug:?}");
        }

        // Step 3: content
        let content = match content {
            Some(supplied) => {
                info!("Using supplied content for {name:?}");
                supplied
            }
            None => {
                self.generators
                    .cultivation_article(&name, title.as_deref(), &language)
                    .await
            }
        };

        // Step 4: brief description
        let brief_description = match (brief_description, non_blank(content.as_deref())) {
            (Some(supplied), _) => supplied,
            (None, Some(article)) => {
                self.generators
                    .brief_description(&name, article, &language)
                    .await
            }
            (None, None) => {
                info!("No content for {name:?}; brief description left empty");
                None
            }
        };

        // Step 5: insert
        if let Some(existing) = self.store.find_by_slug_and_language(&slug, &language).await? {
            warn!("Slug {slug:?} ({language}) already taken by plant {}", existing.id);
            return Err(StoreError::Conflict { slug, language }.into());
        }
        let plant = NewPlant {
            name,
            language,
            slug,
            title,
            scientific_name,
            content,
            brief_description,
        };
        info!(
            "Inserting plant {:?} with slug {:?} ({})",
            plant.name, plant.slug, plant.language
        );

        // The unique index still decides races between concurrent creates.
        Ok(self.store.insert(plant).await?)
    }
}
