use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::generation::GenerationConfig;

/// Image models offered by the generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageModel {
    #[serde(rename = "flux-schnell")]
    FluxSchnell,
    #[serde(rename = "flux-dev")]
    FluxDev,
    #[serde(rename = "sdxl")]
    StableDiffusionXl,
}

impl ImageModel {
    /// Model name for display
    pub fn name(&self) -> &str {
        match self {
            Self::FluxSchnell => "FLUX.1 [schnell]",
            Self::FluxDev => "FLUX.1 [dev]",
            Self::StableDiffusionXl => "Stable Diffusion XL",
        }
    }

    /// Model ID sent to the backend as `selectedModel`
    pub fn id(&self) -> &str {
        match self {
            Self::FluxSchnell => "flux-schnell",
            Self::FluxDev => "flux-dev",
            Self::StableDiffusionXl => "sdxl",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::FluxSchnell => "Fast drafts in a handful of steps",
            Self::FluxDev => "Higher fidelity, slower",
            Self::StableDiffusionXl => "Classic SDXL, strong prompt adherence with high guidance",
        }
    }

    /// Per-model inference defaults
    pub fn default_config(&self) -> GenerationConfig {
        match self {
            Self::FluxSchnell => GenerationConfig { steps: 4, guidance_scale: 3.5 },
            Self::FluxDev => GenerationConfig { steps: 28, guidance_scale: 3.5 },
            Self::StableDiffusionXl => GenerationConfig { steps: 30, guidance_scale: 7.5 },
        }
    }

    /// All available models
    pub fn all() -> [ImageModel; 3] {
        [Self::FluxSchnell, Self::FluxDev, Self::StableDiffusionXl]
    }
}

impl Default for ImageModel {
    fn default() -> Self {
        Self::FluxSchnell
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ImageModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Landscape => "4:3",
            Self::Portrait => "3:4",
            Self::Wide => "16:9",
            Self::Tall => "9:16",
        }
    }

    /// Backend `imageSize` preset for this ratio
    pub fn image_size(&self) -> &'static str {
        match self {
            Self::Square => "square_hd",
            Self::Landscape => "landscape_4_3",
            Self::Portrait => "portrait_4_3",
            Self::Wide => "landscape_16_9",
            Self::Tall => "portrait_16_9",
        }
    }

    pub fn all() -> [AspectRatio; 5] {
        [Self::Square, Self::Landscape, Self::Portrait, Self::Wide, Self::Tall]
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::UnknownAspectRatio(s.to_string()))
    }
}
