//! Validation & canonicalization of incoming plant data.
//!
//! `validate_new_plant` turns a raw create request into a `DraftPlant` or a
//! rejection. Steps, each short-circuiting:
//! 1. `name` and `language` must be present and non-blank.
//! 2. Canonical name via the AI resolver (best effort, never rejects).
//! 3. Cultivability check; skipped entirely when no credential is configured.
//! 4. No existing record with the same canonical name and language.
//! 5. Scientific name lookup when the caller supplied none.

use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::plants::generators::FieldGenerators;
use crate::plants::models::{non_blank, CreatePlantRequest, DraftPlant, PlantUpdate};
use crate::plants::slug::slugify;
use crate::plants::store::PlantStore;

pub async fn validate_new_plant(
    generators: &FieldGenerators,
    store: &dyn PlantStore,
    request: CreatePlantRequest,
) -> Result<DraftPlant, AppError> {
    // Step 1: required fields
    let (Some(input_name), Some(language)) = (
        non_blank(request.name.as_deref()),
        non_blank(request.language.as_deref()),
    ) else {
        return Err(AppError::BadInput(
            "Missing required fields: name, language".to_string(),
        ));
    };
    let language = language.to_string();

    // Step 2: canonical name
    let name = if generators.is_enabled() {
        generators.canonical_name(input_name, &language).await
    } else {
        warn!("No Gemini credential; using {input_name:?} as the canonical name");
        input_name.to_string()
    };

    // Step 3: cultivability
    if generators.is_enabled() {
        if !generators.is_cultivable(&name, &language).await {
            warn!("{name:?} was not recognised as a cultivable plant");
            return Err(AppError::BadInput(format!(
                "The term '{name}' does not appear to be a cultivable plant. Please enter a valid plant name."
            )));
        }
    } else {
        warn!("No Gemini credential; skipping cultivability check for {name:?}");
    }

    // Step 4: duplicate name + language
    if let Some(existing) = store.find_by_name_and_language(&name, &language).await? {
        warn!(
            "Plant {name:?} ({language}) already exists with id {}",
            existing.id
        );
        return Err(AppError::Conflict(format!(
            "Plant with name '{name}' and language '{language}' already exists"
        )));
    }

    // Step 5: scientific name
    let scientific_name = match non_blank(request.scientific_name.as_deref()) {
        Some(supplied) => Some(supplied.to_string()),
        None if generators.is_enabled() => {
            info!("No scientific name supplied for {name:?}; generating one");
            Some(generators.scientific_name(&name, &language).await)
        }
        None => None,
    };

    info!("Validated new plant {name:?} ({language})");
    Ok(DraftPlant {
        name,
        language,
        scientific_name,
        title: request.title,
        slug: request.slug,
        content: request.content,
        brief_description: request.brief_description,
    })
}

/// Checks and normalises a partial update before it reaches the store.
///
/// `name` and `language` cannot be blanked. A supplied `slug` is normalised
/// and must survive normalisation.
pub fn validate_update(mut update: PlantUpdate) -> Result<PlantUpdate, AppError> {
    if let Some(name) = update.name.take() {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::BadInput("name cannot be empty".to_string()));
        }
        update.name = Some(name.to_string());
    }

    if let Some(language) = update.language.take() {
        let language = language.trim();
        if language.is_empty() {
            return Err(AppError::BadInput("language cannot be empty".to_string()));
        }
        update.language = Some(language.to_string());
    }

    if let Some(slug) = update.slug.take() {
        let slug = slugify(&slug);
        if slug.is_empty() {
            return Err(AppError::BadInput(
                "slug must contain at least one letter or digit".to_string(),
            ));
        }
        update.slug = Some(slug);
    }

    Ok(update)
}

/// Rejects an update that would give plant `id` the same name and language
/// as another record. Only runs when `name` or `language` changes.
pub async fn ensure_unique_name_on_update(
    store: &dyn PlantStore,
    id: Uuid,
    update: &PlantUpdate,
) -> Result<(), AppError> {
    if update.name.is_none() && update.language.is_none() {
        return Ok(());
    }

    let current = store
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Plant {id} not found")))?;
    let name = update.name.as_deref().unwrap_or(&current.name);
    let language = update.language.as_deref().unwrap_or(&current.language);

    match store.find_by_name_and_language(name, language).await? {
        Some(existing) if existing.id != id => {
            warn!(
                "Update of plant {id} would duplicate {name:?} ({language}) held by {}",
                existing.id
            );
            Err(AppError::Conflict(format!(
                "Plant with name '{name}' and language '{language}' already exists"
            )))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::memory_pool;
    use crate::llm_client::TextGenerator;
    use crate::plants::generators::testing::*;
    use crate::plants::models::NewPlant;
    use crate::plants::prompts::SCIENTIFIC_NAME_UNAVAILABLE;
    use crate::plants::store::SqlitePlantStore;

    fn request(name: &str, language: &str) -> CreatePlantRequest {
        CreatePlantRequest {
            name: Some(name.to_string()),
            language: Some(language.to_string()),
            ..Default::default()
        }
    }

    fn enabled(script: ScriptedGenerator) -> (FieldGenerators, Arc<ScriptedGenerator>) {
        let llm = Arc::new(script);
        let dyn_llm: Arc<dyn TextGenerator> = llm.clone();
        (FieldGenerators::new(Some(dyn_llm), "test-model"), llm)
    }

    fn sunflower_script() -> ScriptedGenerator {
        ScriptedGenerator::new(|prompt| {
            let answer = if prompt.starts_with(CANONICAL) {
                "Sunflower"
            } else if prompt.starts_with(CULTIVABLE) {
                "yes"
            } else if prompt.starts_with(SCIENTIFIC) {
                "Helianthus annuus"
            } else {
                return Ok(None);
            };
            Ok(Some(answer.to_string()))
        })
    }

    #[tokio::test]
    async fn test_missing_fields_rejected() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let generators = FieldGenerators::new(None, "test-model");

        for req in [
            CreatePlantRequest::default(),
            request("Rosa", "   "),
            request("  ", "pt-BR"),
        ] {
            let err = validate_new_plant(&generators, &store, req).await.unwrap_err();
            assert!(matches!(err, AppError::BadInput(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn test_canonicalizes_and_generates_scientific_name() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let (generators, llm) = enabled(sunflower_script());

        let draft = validate_new_plant(&generators, &store, request(" Girasol ", "en-US"))
            .await
            .unwrap();

        assert_eq!(draft.name, "Sunflower");
        assert_eq!(draft.language, "en-US");
        assert_eq!(draft.scientific_name.as_deref(), Some("Helianthus annuus"));
        assert_eq!(llm.calls_starting_with(CULTIVABLE), 1);
        assert!(llm.prompts.lock().unwrap()[1].contains("\"Sunflower\""));
    }

    #[tokio::test]
    async fn test_not_cultivable_is_bad_input() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let (generators, llm) = enabled(ScriptedGenerator::new(|prompt| {
            if prompt.starts_with(CULTIVABLE) {
                Ok(Some("no".to_string()))
            } else {
                Ok(Some("Rock".to_string()))
            }
        }));

        let err = validate_new_plant(&generators, &store, request("Rock", "en-US"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadInput(ref m) if m.contains("cultivable")));
        assert_eq!(llm.calls_starting_with(SCIENTIFIC), 0);
    }

    #[tokio::test]
    async fn test_duplicate_canonical_name_is_conflict() {
        let store = SqlitePlantStore::new(memory_pool().await);
        store
            .insert(new_plant("Sunflower", "sunflower", "en-US"))
            .await
            .unwrap();
        let (generators, _) = enabled(sunflower_script());

        let err = validate_new_plant(&generators, &store, request("Girasol", "en-US"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_supplied_scientific_name_is_kept() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let (generators, llm) = enabled(sunflower_script());
        let mut req = request("Girasol", "en-US");
        req.scientific_name = Some("Helianthus".into());

        let draft = validate_new_plant(&generators, &store, req).await.unwrap();
        assert_eq!(draft.scientific_name.as_deref(), Some("Helianthus"));
        assert_eq!(llm.calls_starting_with(SCIENTIFIC), 0);
    }

    #[tokio::test]
    async fn test_scientific_sentinel_is_accepted() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let (generators, _) = enabled(ScriptedGenerator::new(|prompt| {
            if prompt.starts_with(CULTIVABLE) {
                Ok(Some("yes".into()))
            } else if prompt.starts_with(SCIENTIFIC) {
                Ok(Some("Information unavailable.".into()))
            } else {
                Ok(None)
            }
        }));

        let draft = validate_new_plant(&generators, &store, request("Mystery Fern", "en-US"))
            .await
            .unwrap();
        assert_eq!(draft.name, "Mystery Fern");
        assert_eq!(
            draft.scientific_name.as_deref(),
            Some(SCIENTIFIC_NAME_UNAVAILABLE)
        );
    }

    #[tokio::test]
    async fn test_without_credential_nothing_is_generated() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let generators = FieldGenerators::new(None, "test-model");

        let draft = validate_new_plant(&generators, &store, request("Rock", "en-US"))
            .await
            .unwrap();
        assert_eq!(draft.name, "Rock");
        assert!(draft.scientific_name.is_none());
    }

    fn new_plant(name: &str, slug: &str, language: &str) -> NewPlant {
        NewPlant {
            name: name.into(),
            language: language.into(),
            slug: slug.into(),
            title: None,
            scientific_name: None,
            content: None,
            brief_description: None,
        }
    }

    #[tokio::test]
    async fn test_update_to_taken_name_is_conflict() {
        let store = SqlitePlantStore::new(memory_pool().await);
        store.insert(new_plant("Mint", "mint", "en-US")).await.unwrap();
        let basil = store.insert(new_plant("Basil", "basil", "en-US")).await.unwrap();

        let rename = PlantUpdate {
            name: Some("Mint".into()),
            ..Default::default()
        };
        let err = ensure_unique_name_on_update(&store, basil.id, &rename)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("Mint") && m.contains("en-US")));

        // Moving to a language where the name is free is fine.
        let relocate = PlantUpdate {
            name: Some("Mint".into()),
            language: Some("fr-FR".into()),
            ..Default::default()
        };
        ensure_unique_name_on_update(&store, basil.id, &relocate)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_keeping_own_name_is_allowed() {
        let store = SqlitePlantStore::new(memory_pool().await);
        let basil = store.insert(new_plant("Basil", "basil", "en-US")).await.unwrap();

        let same = PlantUpdate {
            name: Some("Basil".into()),
            ..Default::default()
        };
        ensure_unique_name_on_update(&store, basil.id, &same)
            .await
            .unwrap();

        let untouched = PlantUpdate {
            content: Some(Some("Pinch the flowers.".into())),
            ..Default::default()
        };
        ensure_unique_name_on_update(&store, Uuid::new_v4(), &untouched)
            .await
            .unwrap();
    }

    #[test]
    fn test_validate_update_normalises_slug() {
        let update = PlantUpdate {
            slug: Some("Minha Rosa!".into()),
            name: Some("  Rosa ".into()),
            ..Default::default()
        };
        let update = validate_update(update).unwrap();
        assert_eq!(update.slug.as_deref(), Some("minha-rosa"));
        assert_eq!(update.name.as_deref(), Some("Rosa"));
    }

    #[test]
    fn test_validate_update_rejects_blank_values() {
        for update in [
            PlantUpdate {
                slug: Some("!!!".into()),
                ..Default::default()
            },
            PlantUpdate {
                name: Some(" ".into()),
                ..Default::default()
            },
            PlantUpdate {
                language: Some("".into()),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                validate_update(update),
                Err(AppError::BadInput(_))
            ));
        }
    }
}
