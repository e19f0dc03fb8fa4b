/// Avatar System
///
/// Resolves the image shown for each avatar category through an ordered
/// fallback chain, and manages the per-category custom images participants
/// can upload.

pub mod catalog;
pub mod category;
pub mod overrides;
pub mod resolver;
pub mod upload;

pub use catalog::{AvatarCatalog, CatalogEntry};
pub use category::AvatarCategory;
pub use overrides::AvatarOverrideStore;
pub use resolver::{AvatarPreview, AvatarResolver, AvatarSource, AvatarStage, ResolvedAvatar};
pub use upload::AcceptedImage;
