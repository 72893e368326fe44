//! Per-user profession and UI preferences.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, RoadmapError};
use crate::models::User;
use crate::storage::RoadmapStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub profession: Option<String>,
    pub preferences: Value,
}

impl From<&User> for UserSettings {
    fn from(user: &User) -> Self {
        Self {
            profession: user.profession.clone(),
            preferences: user.preferences.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSettingsUpdate {
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct UserSettingsService {
    store: Arc<dyn RoadmapStore>,
}

impl UserSettingsService {
    pub fn new(store: Arc<dyn RoadmapStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, user: &User) -> UserSettings {
        UserSettings::from(user)
    }

    /// Set the profession and shallow-merge preferences
    pub async fn update(&self, user: &User, update: UserSettingsUpdate) -> Result<UserSettings> {
        if let Some(profession) = &update.profession {
            let directions = self.store.directions().await?;
            if !directions.contains(profession) {
                return Err(RoadmapError::bad_request(format!(
                    "Unknown profession: {profession}"
                )));
            }
        }

        let preferences = match update.preferences {
            Some(Value::Object(incoming)) => Some(incoming),
            Some(_) => {
                return Err(RoadmapError::bad_request("Preferences must be a JSON object"));
            }
            None => None,
        };

        let saved = self
            .store
            .update_settings(user.id, update.profession.as_deref(), preferences.as_ref())
            .await?
            .ok_or_else(|| RoadmapError::not_found("User not found"))?;
        debug!(user_id = saved.id, "User settings updated");
        Ok(UserSettings::from(&saved))
    }
}
