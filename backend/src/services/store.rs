//! JSON flat-file persistence
//!
//! Each collection lives in its own file under the data directory and is
//! read and rewritten whole. Writes land in a temporary sibling first and are
//! renamed into place, so a failed write leaves the previous file intact.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared::{
    ChatEntry, Location, NewPlant, Plant, PlantUpdate, ProfileInput, UserProfile,
    CHAT_HISTORY_LIMIT,
};

use crate::error::{AppError, AppResult};

const PLANTS_FILE: &str = "plants.json";
const LOCATION_FILE: &str = "location.json";
const CHAT_HISTORY_FILE: &str = "chat_history.json";
const PROFILE_FILE: &str = "user_profile.json";

/// Default number of chat entries returned
pub const DEFAULT_HISTORY_PAGE: usize = 50;

/// File-backed store for plants, location and chat history
pub struct GardenStore {
    data_dir: PathBuf,
    max_plants: usize,
    lock: Mutex<()>,
}

fn persistence<E: std::fmt::Display>(path: &Path) -> impl FnOnce(E) -> AppError + '_ {
    move |e| AppError::PersistenceUnavailable(format!("{}: {}", path.display(), e))
}

impl GardenStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_plants: 50,
            lock: Mutex::new(()),
        }
    }

    pub fn with_max_plants(mut self, max_plants: usize) -> Self {
        self.max_plants = max_plants;
        self
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    async fn read<T: DeserializeOwned>(&self, file: &str) -> AppResult<Option<T>> {
        let path = self.path(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(persistence(&path)(e)),
        };

        let value = serde_json::from_slice(&bytes).map_err(persistence(&path))?;
        Ok(Some(value))
    }

    async fn write<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> AppResult<()> {
        let path = self.path(file);
        let tmp = self.path(&format!("{}.tmp", file));
        let json = serde_json::to_vec_pretty(value).map_err(persistence(&path))?;

        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(persistence(&self.data_dir))?;
        tokio::fs::write(&tmp, json)
            .await
            .map_err(persistence(&tmp))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(persistence(&path))?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    // Collection access

    pub async fn load_plants(&self) -> AppResult<Vec<Plant>> {
        let _guard = self.lock.lock().await;
        self.read_plants().await
    }

    pub async fn save_plants(&self, plants: &[Plant]) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        self.write(PLANTS_FILE, plants).await
    }

    pub async fn load_location(&self) -> AppResult<Option<Location>> {
        let _guard = self.lock.lock().await;
        self.read(LOCATION_FILE).await
    }

    pub async fn save_location(&self, location: &Location) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        self.write(LOCATION_FILE, location).await
    }

    async fn read_plants(&self) -> AppResult<Vec<Plant>> {
        Ok(self.read(PLANTS_FILE).await?.unwrap_or_default())
    }

    /// Apply `change` to the plant list and write it back
    async fn modify_plant<F>(&self, id: Uuid, change: F) -> AppResult<Plant>
    where
        F: FnOnce(&mut Plant),
    {
        let _guard = self.lock.lock().await;
        let mut plants = self.read_plants().await?;
        let plant = plants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Plant {}", id)))?;

        change(plant);
        let updated = plant.clone();
        self.write(PLANTS_FILE, &plants).await?;
        Ok(updated)
    }

    // Plant operations

    pub async fn add_plant(&self, input: NewPlant) -> AppResult<Plant> {
        let now = Utc::now();
        shared::validate_new_plant(&input, now)?;

        let _guard = self.lock.lock().await;
        let mut plants = self.read_plants().await?;
        if plants.len() >= self.max_plants {
            return Err(AppError::BadRequest(format!(
                "You can track at most {} plants",
                self.max_plants
            )));
        }

        let plant = Plant::new(input, now);
        plants.push(plant.clone());
        self.write(PLANTS_FILE, &plants).await?;

        tracing::info!("Added plant {} ({})", plant.species, plant.id);
        Ok(plant)
    }

    pub async fn get_plant(&self, id: Uuid) -> AppResult<Plant> {
        self.load_plants()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Plant {}", id)))
    }

    pub async fn update_plant(&self, id: Uuid, update: PlantUpdate) -> AppResult<Plant> {
        shared::validate_plant_update(&update, Utc::now())?;
        self.modify_plant(id, |plant| plant.apply(update)).await
    }

    /// Record a watering; a time in the future is recorded as now
    pub async fn mark_watered(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<Plant> {
        let at = at.min(Utc::now());
        self.modify_plant(id, |plant| plant.last_watered = Some(at))
            .await
    }

    pub async fn delete_plant(&self, id: Uuid) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut plants = self.read_plants().await?;
        let before = plants.len();
        plants.retain(|p| p.id != id);
        if plants.len() == before {
            return Err(AppError::NotFound(format!("Plant {}", id)));
        }

        self.write(PLANTS_FILE, &plants).await?;
        tracing::info!("Deleted plant {}", id);
        Ok(())
    }

    // Chat history

    /// Append an exchange, keeping only the most recent entries
    pub async fn add_chat_entry(&self, entry: ChatEntry) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut history: Vec<ChatEntry> = self.read(CHAT_HISTORY_FILE).await?.unwrap_or_default();
        history.push(entry);
        if history.len() > CHAT_HISTORY_LIMIT {
            let excess = history.len() - CHAT_HISTORY_LIMIT;
            history.drain(..excess);
        }
        self.write(CHAT_HISTORY_FILE, &history).await
    }

    /// The last `limit` exchanges, oldest first
    pub async fn chat_history(&self, limit: Option<usize>) -> AppResult<Vec<ChatEntry>> {
        let _guard = self.lock.lock().await;
        let mut history: Vec<ChatEntry> = self.read(CHAT_HISTORY_FILE).await?.unwrap_or_default();
        let limit = limit.unwrap_or(DEFAULT_HISTORY_PAGE);
        if history.len() > limit {
            history.drain(..history.len() - limit);
        }
        Ok(history)
    }

    // Profile

    pub async fn load_profile(&self) -> AppResult<Option<UserProfile>> {
        let _guard = self.lock.lock().await;
        self.read(PROFILE_FILE).await
    }

    /// Validate and save the profile, keeping its creation time
    pub async fn save_profile(&self, input: ProfileInput) -> AppResult<UserProfile> {
        shared::validate_profile(&input)?;

        let _guard = self.lock.lock().await;
        let existing: Option<UserProfile> = self.read(PROFILE_FILE).await?;
        let profile = UserProfile::from_input(input, existing.as_ref(), Utc::now());
        self.write(PROFILE_FILE, &profile).await?;

        tracing::info!("Saved profile for {}", profile.name);
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{LocationSource, Placement, SunPreference};

    fn new_plant(species: &str) -> NewPlant {
        NewPlant {
            species: species.to_string(),
            scientific_name: None,
            placement: Placement::Balcony,
            sun_preference: SunPreference::PartialSun,
            watering_interval_days: 3,
            last_watered: None,
            notes: None,
        }
    }

    fn chat(n: usize) -> ChatEntry {
        ChatEntry {
            timestamp: Utc::now(),
            user_message: format!("question {}", n),
            assistant_response: "answer".to_string(),
            plant_context: None,
        }
    }

    #[tokio::test]
    async fn test_missing_files_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path().join("nested"));

        assert!(store.load_plants().await.unwrap().is_empty());
        assert_eq!(store.load_location().await.unwrap(), None);
        assert!(store.chat_history(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plant_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());

        let rose = store.add_plant(new_plant("Rose")).await.unwrap();
        let fern = store.add_plant(new_plant("Fern")).await.unwrap();

        let reopened = GardenStore::new(dir.path());
        let plants = reopened.load_plants().await.unwrap();
        assert_eq!(plants, vec![rose.clone(), fern]);
        assert!(!dir.path().join("plants.json.tmp").exists());

        let watered_at = Utc::now();
        let watered = reopened.mark_watered(rose.id, watered_at).await.unwrap();
        assert_eq!(watered.last_watered, Some(watered_at));
        assert_eq!(reopened.get_plant(rose.id).await.unwrap(), watered);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());
        let plant = store.add_plant(new_plant("Mint")).await.unwrap();

        let updated = store
            .update_plant(
                plant.id,
                PlantUpdate {
                    placement: Some(Placement::OpenRoof),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.placement, Placement::OpenRoof);
        assert_eq!(updated.species, "Mint");

        store.delete_plant(plant.id).await.unwrap();
        assert!(matches!(
            store.get_plant(plant.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_plant(plant.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_plant_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());

        let mut input = new_plant("Rose");
        input.watering_interval_days = 0;
        assert!(matches!(
            store.add_plant(input).await,
            Err(AppError::Validation(_))
        ));
        assert!(store.load_plants().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plant_limit() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path()).with_max_plants(1);

        store.add_plant(new_plant("Rose")).await.unwrap();
        assert!(matches!(
            store.add_plant(new_plant("Fern")).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_location_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());

        let location = Location::manual("Lahore", "PK");
        store.save_location(&location).await.unwrap();

        let loaded = store.load_location().await.unwrap().unwrap();
        assert_eq!(loaded.source, LocationSource::Manual);
        assert_eq!(loaded, location);
    }

    #[tokio::test]
    async fn test_chat_history_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());

        for n in 0..105 {
            store.add_chat_entry(chat(n)).await.unwrap();
        }

        let all = store.chat_history(Some(1000)).await.unwrap();
        assert_eq!(all.len(), CHAT_HISTORY_LIMIT);
        assert_eq!(all[0].user_message, "question 5");

        let page = store.chat_history(None).await.unwrap();
        assert_eq!(page.len(), DEFAULT_HISTORY_PAGE);
        assert_eq!(page.last().unwrap().user_message, "question 104");
    }

    #[tokio::test]
    async fn test_corrupt_file_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plants.json"), b"{not json").unwrap();

        let store = GardenStore::new(dir.path());
        assert!(matches!(
            store.load_plants().await,
            Err(AppError::PersistenceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_future_watering_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());

        let mut input = new_plant("Rose");
        input.last_watered = Some(Utc::now() + chrono::Duration::days(30));
        let err = store.add_plant(input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.field == "last_watered"));

        let plant = store.add_plant(new_plant("Rose")).await.unwrap();
        let err = store
            .update_plant(
                plant.id,
                PlantUpdate {
                    last_watered: Some(Utc::now() + chrono::Duration::days(2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let watered = store
            .mark_watered(plant.id, Utc::now() + chrono::Duration::days(30))
            .await
            .unwrap();
        assert!(watered.last_watered.unwrap() <= Utc::now());
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = GardenStore::new(dir.path());
        assert_eq!(store.load_profile().await.unwrap(), None);

        let first = store
            .save_profile(ProfileInput {
                name: "Ayesha".to_string(),
                email: "ayesha@example.com".to_string(),
                location: "Model Town, Lahore".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let second = store
            .save_profile(ProfileInput {
                name: "Ayesha".to_string(),
                email: "ayesha@example.com".to_string(),
                profession: "Architect".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(dir.path().join("user_profile.json").exists());
        let loaded = GardenStore::new(dir.path()).load_profile().await.unwrap();
        assert_eq!(loaded, Some(second));

        assert!(matches!(
            store
                .save_profile(ProfileInput {
                    email: "not-an-email".to_string(),
                    ..Default::default()
                })
                .await,
            Err(AppError::Validation(_))
        ));
    }
}
