//! Persistence for plant records.
//!
//! `PlantStore` is the seam the pipeline depends on; `SqlitePlantStore` is the
//! production backend. The `(slug, language)` unique index is authoritative:
//! its violation is reported as `StoreError::Conflict` whatever the pre-checks
//! said.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::plants::models::{NewPlant, PlantRow, PlantUpdate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Plant with slug '{slug}' and language '{language}' already exists")]
    Conflict { slug: String, language: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait PlantStore: Send + Sync {
    async fn find_by_name_and_language(
        &self,
        name: &str,
        language: &str,
    ) -> Result<Option<PlantRow>, StoreError>;

    async fn find_by_slug_and_language(
        &self,
        slug: &str,
        language: &str,
    ) -> Result<Option<PlantRow>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlantRow>, StoreError>;

    async fn list_all(&self) -> Result<Vec<PlantRow>, StoreError>;

    async fn insert(&self, plant: NewPlant) -> Result<PlantRow, StoreError>;

    /// Applies only the fields present in `update`. `Ok(None)` when `id` is unknown.
    async fn update(&self, id: Uuid, update: PlantUpdate) -> Result<Option<PlantRow>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<Option<PlantRow>, StoreError>;
}

pub struct SqlitePlantStore {
    pool: SqlitePool,
}

impl SqlitePlantStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl PlantStore for SqlitePlantStore {
    async fn find_by_name_and_language(
        &self,
        name: &str,
        language: &str,
    ) -> Result<Option<PlantRow>, StoreError> {
        let row = sqlx::query_as::<_, PlantRow>(
            "SELECT * FROM plants WHERE name = ? AND language = ? LIMIT 1",
        )
        .bind(name.trim())
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_slug_and_language(
        &self,
        slug: &str,
        language: &str,
    ) -> Result<Option<PlantRow>, StoreError> {
        let row = sqlx::query_as::<_, PlantRow>(
            "SELECT * FROM plants WHERE slug = ? AND language = ? LIMIT 1",
        )
        .bind(slug)
        .bind(language)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PlantRow>, StoreError> {
        let row = sqlx::query_as::<_, PlantRow>("SELECT * FROM plants WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_all(&self) -> Result<Vec<PlantRow>, StoreError> {
        let rows = sqlx::query_as::<_, PlantRow>("SELECT * FROM plants ORDER BY created_at, rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, plant: NewPlant) -> Result<PlantRow, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let result = sqlx::query_as::<_, PlantRow>(
            r#"
            INSERT INTO plants
                (id, name, language, scientific_name, title, brief_description,
                 content, slug, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&plant.name)
        .bind(&plant.language)
        .bind(&plant.scientific_name)
        .bind(&plant.title)
        .bind(&plant.brief_description)
        .bind(&plant.content)
        .bind(&plant.slug)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                info!("Inserted plant {} ({:?}, {})", row.id, row.name, row.language);
                Ok(row)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(
                    "Unique violation inserting slug {:?} for language {:?}",
                    plant.slug, plant.language
                );
                Err(StoreError::Conflict {
                    slug: plant.slug,
                    language: plant.language,
                })
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn update(&self, id: Uuid, update: PlantUpdate) -> Result<Option<PlantRow>, StoreError> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let new_slug = update.slug.clone();
        let new_language = update.language.clone();

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE plants SET updated_at = ");
        builder.push_bind(Utc::now());
        if let Some(name) = update.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(language) = update.language {
            builder.push(", language = ").push_bind(language);
        }
        if let Some(slug) = update.slug {
            builder.push(", slug = ").push_bind(slug);
        }
        if let Some(title) = update.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(scientific_name) = update.scientific_name {
            builder.push(", scientific_name = ").push_bind(scientific_name);
        }
        if let Some(brief_description) = update.brief_description {
            builder.push(", brief_description = ").push_bind(brief_description);
        }
        if let Some(content) = update.content {
            builder.push(", content = ").push_bind(content);
        }
        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        match builder
            .build_query_as::<PlantRow>()
            .fetch_optional(&self.pool)
            .await
        {
            Ok(Some(row)) => {
                info!("Updated plant {id}");
                Ok(Some(row))
            }
            Ok(None) => {
                warn!("Plant {id} not found for update");
                Ok(None)
            }
            Err(e) if is_unique_violation(&e) => {
                let current = self.find_by_id(id).await?;
                let (slug, language) = match current {
                    Some(row) => (
                        new_slug.unwrap_or(row.slug),
                        new_language.unwrap_or(row.language),
                    ),
                    None => (new_slug.unwrap_or_default(), new_language.unwrap_or_default()),
                };
                Err(StoreError::Conflict { slug, language })
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<Option<PlantRow>, StoreError> {
        let row = sqlx::query_as::<_, PlantRow>("DELETE FROM plants WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match &row {
            Some(_) => info!("Deleted plant {id}"),
            None => warn!("Plant {id} not found for deletion"),
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;

    fn new_plant(name: &str, slug: &str, language: &str) -> NewPlant {
        NewPlant {
            name: name.to_string(),
            language: language.to_string(),
            slug: slug.to_string(),
            title: None,
            scientific_name: None,
            content: None,
            brief_description: None,
        }
    }

    async fn store() -> SqlitePlantStore {
        SqlitePlantStore::new(memory_pool().await)
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = store().await;
        let created = store
            .insert(new_plant("Sunflower", "sunflower", "en-US"))
            .await
            .unwrap();

        assert_eq!(created.slug, "sunflower");
        assert!(created.content.is_none());

        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id, created);

        let by_name = store
            .find_by_name_and_language("Sunflower", "en-US")
            .await
            .unwrap();
        assert_eq!(by_name.map(|p| p.id), Some(created.id));

        assert!(store
            .find_by_name_and_language("Sunflower", "pt-BR")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .find_by_slug_and_language("sunflower", "en-US")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_duplicate_slug_and_language_is_conflict() {
        let store = store().await;
        store
            .insert(new_plant("Rose", "rose", "en-US"))
            .await
            .unwrap();

        let err = store
            .insert(new_plant("Garden Rose", "rose", "en-US"))
            .await
            .unwrap_err();
        match err {
            StoreError::Conflict { slug, language } => {
                assert_eq!(slug, "rose");
                assert_eq!(language, "en-US");
            }
            other => panic!("expected conflict, got {other:?}"),
        }

        // Same slug in another language is fine.
        store
            .insert(new_plant("Rose", "rose", "fr-FR"))
            .await
            .unwrap();
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_id_and_untouched_fields() {
        let store = store().await;
        let mut plant = new_plant("Basil", "basil", "en-US");
        plant.title = Some("Sweet Basil Secrets".to_string());
        plant.content = Some("old".to_string());
        let created = store.insert(plant).await.unwrap();

        let update = PlantUpdate {
            content: Some(Some("new".to_string())),
            title: Some(None),
            ..Default::default()
        };
        let updated = store.update(created.id, update).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.content.as_deref(), Some("new"));
        assert!(updated.title.is_none());
        assert_eq!(updated.slug, "basil");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_slug_collision_is_conflict() {
        let store = store().await;
        store
            .insert(new_plant("Mint", "mint", "en-US"))
            .await
            .unwrap();
        let basil = store
            .insert(new_plant("Basil", "basil", "en-US"))
            .await
            .unwrap();

        let update = PlantUpdate {
            slug: Some("mint".to_string()),
            ..Default::default()
        };
        let err = store.update(basil.id, update).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict { ref slug, ref language } if slug == "mint" && language == "en-US"
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = store().await;
        let update = PlantUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        assert!(store.update(Uuid::new_v4(), update).await.unwrap().is_none());
        assert!(store.delete(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_record() {
        let store = store().await;
        let created = store
            .insert(new_plant("Thyme", "thyme", "en-US"))
            .await
            .unwrap();

        let deleted = store.delete(created.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(store.find_by_id(created.id).await.unwrap().is_none());
    }
}
