//! src/configuration.rs
use config::{Config, File};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email: EmailSettings,
    #[serde(default)]
    pub secret_store: SecretStoreSettings,
}

impl Settings {
    pub fn set_email_url(&mut self, email_url: String) {
        self.email.api_url = email_url;
    }

    pub fn set_project_url(&mut self, project_url: String) {
        self.secret_store.project_url = Some(project_url);
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EmailSettings {
    pub api_url: String,
    pub sender_name: String,
    pub sender_email: String,
    #[serde(default)]
    pub escape_html: bool,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct SecretStoreSettings {
    pub project_url: Option<String>,
    pub service_role_key: Option<Secret<String>>,
}

impl SecretStoreSettings {
    // Absent values become empty strings.
    pub fn project_url(&self) -> String {
        self.project_url.clone().unwrap_or_default()
    }

    pub fn service_role_key(&self) -> Secret<String> {
        self.service_role_key
            .clone()
            .unwrap_or_else(|| Secret::new(String::new()))
    }
}

#[derive(PartialEq, Debug)]
pub enum Environment {
    Local,
    Production,
}
impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_ref() {
            "local" => Ok(Environment::Local),
            "production" => Ok(Environment::Production),
            _ => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                s
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment.
    // Default to `local` if not specified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base")).required(true))
        .add_source(File::from(configuration_directory.join(environment.as_str())).required(true))
        .build()?;

    let mut settings: Settings = settings.try_deserialize()?;

    if environment == Environment::Local {
        // A missing .env is fine: the store settings fall back to empty strings.
        let _ = dotenvy::dotenv();
    }

    settings.secret_store = envy::from_env::<SecretStoreSettings>().map_err(|e| {
        config::ConfigError::Message(format!(
            "Failed to parse secret store settings from environment: {}",
            e
        ))
    })?;

    Ok(settings)
}
