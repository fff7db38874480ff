use serde::{Deserialize, Serialize};

use super::EncodedImage;
use crate::errors::CodecError;

/// Image returned by the synthesis service, kept as a displayable data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub image_url: String,
    pub caption_text: Option<String>,
}

impl GenerationResult {
    pub fn new(image: &EncodedImage, caption_text: Option<String>) -> Self {
        Self {
            image_url: image.to_data_url(),
            caption_text,
        }
    }

    /// Splits the stored data URL back into payload and mime type, e.g. to
    /// feed the result into a follow-up edit.
    pub fn image(&self) -> Result<EncodedImage, CodecError> {
        EncodedImage::from_data_url(&self.image_url)
    }
}

#[cfg(test)]
mod tests {
    use super::GenerationResult;
    use crate::images::EncodedImage;

    #[test]
    fn result_image_recovers_source_parts() -> anyhow::Result<()> {
        let source = EncodedImage::new("CCCC", "image/png");
        let result = GenerationResult::new(&source, Some("studio shot".to_string()));
        assert_eq!(result.image_url, "data:image/png;base64,CCCC");
        assert_eq!(result.image()?, source);
        Ok(())
    }
}
