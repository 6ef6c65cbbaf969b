//! Annotation corpus loading and lookup by image key

mod raw;
mod record;
mod store;

pub use raw::ObjectTypeField;
pub use record::{image_key, image_key_for_path, AnnotationRecord, VEHICLES};
pub use store::{AnnotationError, AnnotationStore};
