pub mod actions;
mod defaults;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::path::PathBuf;
use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

/// How long the "sent" confirmation stays up before the form closes itself.
const DEFAULT_SUCCESS_DELAY_MS: u64 = 1500;
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(DEFAULT_SUCCESS_DELAY_MS);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Podium".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub success_delay_ms: u64,
}

impl FormConfig {
    pub const fn success_delay(&self) -> Duration {
        Duration::from_millis(self.success_delay_ms)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            success_delay_ms: DEFAULT_SUCCESS_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct InquiryConfig {
    /// JSON-lines file that receives submitted inquiries.
    pub outbox: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub inquiries: InquiryConfig,
}
