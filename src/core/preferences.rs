use crate::domain::model::Preferences;
use crate::domain::ports::StateStore;
use crate::utils::error::Result;

pub const PREFERENCES_KEY: &str = "darkmode-store.json";

/// Reads persisted display preferences, falling back to defaults when the
/// file is missing or unreadable.
pub async fn load_preferences<S: StateStore>(store: &S) -> Result<Preferences> {
    match store.read_state(PREFERENCES_KEY).await? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Ignoring unreadable preferences: {}", e);
            Preferences::default()
        })),
        None => Ok(Preferences::default()),
    }
}

pub async fn save_preferences<S: StateStore>(store: &S, preferences: &Preferences) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(preferences)?;
    store.write_state(PREFERENCES_KEY, &bytes).await
}

/// Flips dark mode and persists the result.
pub async fn toggle_dark_mode<S: StateStore>(store: &S) -> Result<Preferences> {
    let mut preferences = load_preferences(store).await?;
    preferences.dark_mode = !preferences.dark_mode;
    save_preferences(store, &preferences).await?;
    tracing::debug!("🌓 Dark mode set to {}", preferences.dark_mode);
    Ok(preferences)
}
