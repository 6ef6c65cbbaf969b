//! File naming convention for image pairs

use std::path::{Path, PathBuf};
use vqa_core::DatasetSettings;

/// Partner of `X.jpg` is `X 2.jpg` under the default convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairNaming {
    pub partner_suffix: String,
    pub extension: String,
}

impl PairNaming {
    pub fn new(partner_suffix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            partner_suffix: partner_suffix.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn from_settings(settings: &DatasetSettings) -> Self {
        Self::new(settings.pair_suffix.clone(), settings.extension.clone())
    }

    fn dotted_extension(&self) -> String {
        format!(".{}", self.extension)
    }

    /// File name carries the pair extension
    pub fn is_image(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.dotted_extension())
    }

    /// File name is the second image of some pair
    pub fn is_partner(&self, file_name: &str) -> bool {
        file_name.ends_with(&format!("{}{}", self.partner_suffix, self.dotted_extension()))
    }

    /// Partner file name for a primary, or `None` if it is not a primary
    pub fn partner_name(&self, primary: &str) -> Option<String> {
        if !self.is_image(primary) || self.is_partner(primary) {
            return None;
        }
        let base = primary.strip_suffix(&self.dotted_extension())?;
        Some(format!(
            "{}{}{}",
            base,
            self.partner_suffix,
            self.dotted_extension()
        ))
    }

    pub fn partner_path(&self, primary: &Path) -> Option<PathBuf> {
        let name = primary.file_name()?.to_str()?;
        let partner = self.partner_name(name)?;
        Some(primary.with_file_name(partner))
    }
}

impl Default for PairNaming {
    fn default() -> Self {
        Self::new(" 2", "jpg")
    }
}

/// Folder names made only of ASCII digits hold image pairs
pub(crate) fn is_numbered_folder(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}
