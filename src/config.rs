//! Site configuration module.
//!
//! Handles loading and validating the site's TOML config file. All options
//! have sensible defaults; a missing config file means "use the defaults",
//! and a config file only needs to name the values it overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = ""               # Used for the logo and page titles
//! site_url = ""                # Absolute base URL of the published site
//!
//! input_directory = "notes"    # Vault to scan
//! output_directory = "output"  # Where the site is written
//! media_directory = "media"    # Non-markdown files land here (inside output)
//! static_directory = "static"  # Copied verbatim over the output directory
//! template_file = "template.html"  # Page template (stock template if absent)
//!
//! # If strict is true, generation fails on the first unresolvable link or
//! # embed. If false, unresolved references are dropped with a warning.
//! strict = false
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from the config TOML file.
///
/// User config files need only specify the values they want to override.
/// Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site name, used for the logo and the page title template field.
    pub site_name: String,
    /// Absolute base URL of the published site.
    pub site_url: String,
    /// Vault directory to scan.
    pub input_directory: String,
    /// Directory the generated site is written to.
    pub output_directory: String,
    /// Subdirectory of the output directory where media files are copied.
    pub media_directory: String,
    /// Directory copied verbatim over the output directory, if it exists.
    pub static_directory: String,
    /// Page template file. The embedded stock template is used when the
    /// file does not exist.
    pub template_file: String,
    /// Abort generation on the first unresolvable reference instead of
    /// dropping it with a warning.
    pub strict: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: String::new(),
            site_url: String::new(),
            input_directory: "notes".to_string(),
            output_directory: "output".to_string(),
            media_directory: "media".to_string(),
            static_directory: "static".to_string(),
            template_file: "template.html".to_string(),
            strict: false,
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_directory.is_empty() {
            return Err(ConfigError::Validation(
                "input_directory must not be empty".into(),
            ));
        }
        if self.output_directory.is_empty() {
            return Err(ConfigError::Validation(
                "output_directory must not be empty".into(),
            ));
        }
        if self.input_directory == self.output_directory {
            return Err(ConfigError::Validation(
                "input_directory and output_directory must differ".into(),
            ));
        }
        if self.media_directory.is_empty() || self.media_directory.contains('/') {
            return Err(ConfigError::Validation(
                "media_directory must be a plain directory name".into(),
            ));
        }
        Ok(())
    }
}

/// Load the config file at `path`, falling back to defaults when it does
/// not exist. The result is always validated.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A documented stock config file, printed by `notegarden gen-config`.
pub fn stock_config_toml() -> &'static str {
    r#"# notegarden configuration
# All options are optional - defaults shown below.

# Used for the logo and page titles.
site_name = ""

# Absolute base URL of the published site.
site_url = ""

# Vault directory to scan.
input_directory = "notes"

# Where the generated site is written.
output_directory = "output"

# Non-markdown files are copied here, inside the output directory.
media_directory = "media"

# Copied verbatim over the output directory (stylesheets, favicons, fonts).
static_directory = "static"

# Page template. If the file does not exist, the embedded stock template
# is used; run `notegarden gen-template > template.html` to customize it.
template_file = "template.html"

# If true, generation fails on the first link or embed that cannot be
# resolved. If false, unresolved references are dropped with a warning.
strict = false
"#
}
