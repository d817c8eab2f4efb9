use std::sync::RwLock;

/// Environment variable providing the initial image base url.
pub const IMAGE_FIELD_DOMAIN_VAR: &str = "SERDE_PROJECTION_IMAGE_DOMAIN";

lazy_static::lazy_static! {
    static ref SETTINGS: RwLock<Settings> = RwLock::new(Settings::from_env());
}

/// Process-wide configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base url joined with image paths when an image field has no explicit
    /// base url.
    pub image_field_domain: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            image_field_domain: std::env::var(IMAGE_FIELD_DOMAIN_VAR).ok(),
        }
    }

    pub fn image_field_domain(mut self, value: impl ToString) -> Self {
        self.image_field_domain = Some(value.to_string());
        self
    }

    pub fn current() -> Self {
        SETTINGS
            .read()
            .map(|settings| settings.clone())
            .unwrap_or_default()
    }

    pub fn configure(settings: Settings) {
        if let Ok(mut current) = SETTINGS.write() {
            *current = settings;
        }
    }
}

/// Base url for image fields constructed without one; empty when unset.
pub fn image_base_url() -> String {
    Settings::current().image_field_domain.unwrap_or_default()
}
