use ariel_ratatui::{
    app::App,
    error::NarratorError,
    logging,
    narrator::OpenAiNarrator,
    save::FileSlot,
    settings::{self, Settings},
};
use color_eyre::eyre::{Result, eyre};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let data_dir = settings::data_dir()?;
    let settings = Settings::load();
    logging::init(data_dir.clone(), settings.debug_mode)?;
    log::info!("Ariel start: {}", chrono::Local::now());

    let settings_path = data_dir.join("settings.json");
    if !settings_path.exists() {
        // Leave an editable file behind on first run; the key stays out of it.
        let mut defaults = settings.clone();
        defaults.openai_api_key = None;
        if let Err(e) = defaults.save_to_file(&settings_path) {
            log::warn!("Failed to write default settings: {e}");
        }
    }

    let narrator = match OpenAiNarrator::new(&settings) {
        Ok(narrator) => narrator,
        Err(NarratorError::MissingApiKey) => {
            return Err(eyre!(
                "No OpenAI API key. Set {} or add \"openai_api_key\" to {}",
                settings::API_KEY_ENV,
                settings_path.display()
            ));
        }
        Err(e) => return Err(e.into()),
    };
    let store = FileSlot::in_dir(&data_dir);

    let mut app = App::new(Arc::new(narrator), Box::new(store), settings.history_bound);
    let result = app.run().await;
    if let Err(e) = &result {
        log::error!("Ariel stopped: {e:?}");
    }
    result
}
