use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;
use crate::pdf::PageSize;

/// Default page size preset name
pub const DEFAULT_PAGE_SIZE: &str = "a4";
/// Default margin around each image, in millimetres
pub const DEFAULT_MARGIN_MM: f64 = 10.0;
/// Default file name of the image pipeline's output
pub const DEFAULT_IMAGE_FILE_NAME: &str = "converted_images.pdf";
/// Default file name of the merge pipeline's output
pub const DEFAULT_MERGE_FILE_NAME: &str = "merged.pdf";

/// Page setup for the image pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Size preset ("a4" or "letter"); ignored when both custom dimensions are set
    #[serde(default = "default_page_size")]
    pub size: String,

    /// Custom page width in millimetres
    #[serde(default)]
    pub width_mm: Option<f64>,

    /// Custom page height in millimetres
    #[serde(default)]
    pub height_mm: Option<f64>,

    /// Margin on every side, in millimetres
    #[serde(default = "default_margin_mm")]
    pub margin_mm: f64,
}

fn default_page_size() -> String {
    DEFAULT_PAGE_SIZE.to_string()
}

const fn default_margin_mm() -> f64 {
    DEFAULT_MARGIN_MM
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: default_page_size(),
            width_mm: None,
            height_mm: None,
            margin_mm: default_margin_mm(),
        }
    }
}

impl PageConfig {
    /// Resolve the configured page size.
    pub fn page_size(&self) -> Result<PageSize, Error> {
        if let (Some(width), Some(height)) = (self.width_mm, self.height_mm) {
            return Ok(PageSize::new(width, height));
        }

        PageSize::from_name(&self.size).ok_or_else(|| Error::ConfigInvalid {
            field: "page.size".to_string(),
            reason: format!("unknown page size '{}'", self.size),
        })
    }
}

/// Output naming and location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_image_file_name")]
    pub image_file_name: String,

    #[serde(default = "default_merge_file_name")]
    pub merge_file_name: String,

    /// Directory for CLI output (defaults to the current directory)
    pub dir: Option<PathBuf>,
}

fn default_image_file_name() -> String {
    DEFAULT_IMAGE_FILE_NAME.to_string()
}

fn default_merge_file_name() -> String {
    DEFAULT_MERGE_FILE_NAME.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            image_file_name: default_image_file_name(),
            merge_file_name: default_merge_file_name(),
            dir: None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub page: PageConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigLoad(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations (~/.config/pdf-assembler/config.toml, ./config.toml)
    pub fn load() -> Self {
        let mut candidates = Vec::new();
        if let Some(config_dir) = crate::util::config_dir() {
            candidates.push(config_dir.join("pdf-assembler").join("config.toml"));
        }
        candidates.push(PathBuf::from("config.toml"));

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", path.display(), e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Check that the page leaves a printable area and names are usable.
    pub fn validate(&self) -> Result<(), Error> {
        let page = self.page.page_size()?;

        if !(page.width > 0.0 && page.height > 0.0) {
            return Err(Error::ConfigInvalid {
                field: "page".to_string(),
                reason: format!(
                    "page dimensions must be positive ({} x {})",
                    page.width, page.height
                ),
            });
        }

        let margin = self.page.margin_mm;
        if !(margin >= 0.0) || margin * 2.0 >= page.width.min(page.height) {
            return Err(Error::ConfigInvalid {
                field: "page.margin_mm".to_string(),
                reason: format!("margin {margin} mm leaves no printable area"),
            });
        }

        for (field, name) in [
            ("output.image_file_name", &self.output.image_file_name),
            ("output.merge_file_name", &self.output.merge_file_name),
        ] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(Error::ConfigInvalid {
                    field: field.to_string(),
                    reason: format!("'{name}' is not a plain file name"),
                });
            }
        }

        Ok(())
    }
}
