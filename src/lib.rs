pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        #[serde(default = "default_secret_key")]
        pub secret_key: String,
        #[serde(default = "default_database_url")]
        pub database_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        #[serde(default = "default_cors_origins")]
        pub cors_origins: String,
        #[serde(default = "default_upload_dir")]
        pub upload_dir: std::path::PathBuf,
        #[serde(default = "default_allowed_audio_extensions")]
        pub allowed_audio_extensions: String,
        #[serde(default = "default_whisper_model_path")]
        pub whisper_model_path: String,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        /// Returns the allowed cross-origin sources as individual entries.
        pub fn origins(&self) -> Vec<String> {
            split_csv(&self.cors_origins)
        }

        /// Returns the allowed audio file extensions, lowercased.
        pub fn allowed_extensions(&self) -> Vec<String> {
            split_csv(&self.allowed_audio_extensions)
                .into_iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect()
        }
    }

    fn split_csv(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn default_secret_key() -> String {
        "please-change-this-secret-key".to_string()
    }

    fn default_database_url() -> String {
        "sqlite://data/tasks.db?mode=rwc".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_cors_origins() -> String {
        "http://localhost:5173".to_string()
    }

    fn default_upload_dir() -> std::path::PathBuf {
        std::path::PathBuf::from("uploads")
    }

    fn default_allowed_audio_extensions() -> String {
        "mp3,wav,ogg,m4a".to_string()
    }

    fn default_whisper_model_path() -> String {
        "models/ggml-base.bin".to_string()
    }

}

pub mod entities;
pub mod task;
pub mod transcription;
pub mod upload;
pub mod web;
