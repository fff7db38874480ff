mod encoded;
mod result;

pub use encoded::{EncodedImage, DEFAULT_MIME_TYPE};
pub use result::GenerationResult;
