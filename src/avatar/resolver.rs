/// Avatar Resolver
///
/// Fallback chain for one category: custom override, then the primary
/// default, then the secondary default, then a generated placeholder. The
/// renderer reports load failures and the resolver works out the next step by
/// comparing the failing reference against the category's known images.
use crate::avatar::{AvatarCatalog, AvatarCategory, AvatarOverrideStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Position in the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarStage {
    Override,
    Primary,
    Secondary,
    Placeholder,
}

impl AvatarStage {
    /// Step taken when the image at this stage fails to load
    pub fn next(self) -> AvatarStage {
        match self {
            AvatarStage::Override => AvatarStage::Primary,
            AvatarStage::Primary => AvatarStage::Secondary,
            AvatarStage::Secondary | AvatarStage::Placeholder => AvatarStage::Placeholder,
        }
    }
}

/// What the renderer should draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AvatarSource {
    Image { url: String, alt: String },
    Placeholder { background: String, alt: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAvatar {
    pub category: AvatarCategory,
    pub stage: AvatarStage,
    pub source: AvatarSource,
}

impl ResolvedAvatar {
    /// Image reference, `None` for the placeholder
    pub fn url(&self) -> Option<&str> {
        match &self.source {
            AvatarSource::Image { url, .. } => Some(url),
            AvatarSource::Placeholder { .. } => None,
        }
    }
}

/// Upload panel preview: current image plus whether it is a custom one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarPreview {
    pub avatar: ResolvedAvatar,
    pub is_custom: bool,
}

impl AvatarPreview {
    pub fn caption(&self) -> &'static str {
        if self.is_custom {
            "Custom image"
        } else {
            "Default image"
        }
    }
}

#[derive(Clone)]
pub struct AvatarResolver {
    catalog: Arc<AvatarCatalog>,
    overrides: AvatarOverrideStore,
}

impl AvatarResolver {
    pub fn new(catalog: Arc<AvatarCatalog>, overrides: AvatarOverrideStore) -> Self {
        Self { catalog, overrides }
    }

    pub fn overrides(&self) -> &AvatarOverrideStore {
        &self.overrides
    }

    /// First stage to try: the override if one exists, else the primary
    pub fn initial_stage(override_data: Option<&str>) -> AvatarStage {
        if override_data.is_some() {
            AvatarStage::Override
        } else {
            AvatarStage::Primary
        }
    }

    /// Work out which stage a failing reference belongs to
    ///
    /// Renderers may absolutise URLs, so a stage matches when the failing
    /// reference contains or ends with the stage's image.
    pub fn stage_of_reference(
        &self,
        category: AvatarCategory,
        override_data: Option<&str>,
        failed_reference: &str,
    ) -> AvatarStage {
        if let Some(data) = override_data {
            if reference_matches(failed_reference, data) {
                return AvatarStage::Override;
            }
        }

        if let Some(entry) = self.catalog.entry(category) {
            if reference_matches(failed_reference, &entry.primary) {
                return AvatarStage::Primary;
            }
        }

        // Anything else is treated as the last image in the chain
        AvatarStage::Secondary
    }

    /// Pure rendering of a stage, skipping stages that have nothing to show
    pub fn render(
        &self,
        category: AvatarCategory,
        stage: AvatarStage,
        override_data: Option<&str>,
    ) -> ResolvedAvatar {
        let entry = self.catalog.entry(category);
        let image = |stage: AvatarStage, url: &str| ResolvedAvatar {
            category,
            stage,
            source: AvatarSource::Image {
                url: url.to_string(),
                alt: category.label().to_string(),
            },
        };

        match stage {
            AvatarStage::Override => match override_data {
                Some(data) => image(AvatarStage::Override, data),
                None => self.render(category, AvatarStage::Primary, override_data),
            },
            AvatarStage::Primary => match entry {
                Some(e) if !e.primary.is_empty() => image(AvatarStage::Primary, &e.primary),
                _ => self.render(category, AvatarStage::Secondary, override_data),
            },
            AvatarStage::Secondary => match entry {
                Some(e) if !e.secondary.is_empty() => image(AvatarStage::Secondary, &e.secondary),
                _ => self.render(category, AvatarStage::Placeholder, override_data),
            },
            AvatarStage::Placeholder => ResolvedAvatar {
                category,
                stage: AvatarStage::Placeholder,
                source: AvatarSource::Placeholder {
                    background: self.catalog.placeholder_color(category).to_string(),
                    alt: category.label().to_string(),
                },
            },
        }
    }

    /// Image to show first for a category
    pub async fn resolve(&self, category: AvatarCategory) -> ResolvedAvatar {
        let override_data = self.overrides.get(category).await;
        let stage = Self::initial_stage(override_data.as_deref());
        self.render(category, stage, override_data.as_deref())
    }

    /// Next image after the renderer reports that `failed_reference` did not load
    pub async fn on_load_failure(
        &self,
        category: AvatarCategory,
        failed_reference: &str,
    ) -> ResolvedAvatar {
        let override_data = self.overrides.get(category).await;
        let failed_stage =
            self.stage_of_reference(category, override_data.as_deref(), failed_reference);
        let resolved = self.render(category, failed_stage.next(), override_data.as_deref());

        debug!(
            "Avatar for {} failed at {:?}, falling back to {:?}",
            category, failed_stage, resolved.stage
        );

        resolved
    }

    /// Current image for the upload panel
    pub async fn preview(&self, category: AvatarCategory) -> AvatarPreview {
        let avatar = self.resolve(category).await;
        let is_custom = avatar.stage == AvatarStage::Override;
        AvatarPreview { avatar, is_custom }
    }
}

fn reference_matches(reference: &str, candidate: &str) -> bool {
    !candidate.is_empty() && (reference.contains(candidate) || reference.ends_with(candidate))
}
