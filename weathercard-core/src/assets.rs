//! Static images and fonts used to draw weather cards.
//!
//! Everything is read once at startup into an [`AssetBundle`], which is then
//! shared read-only (typically behind an `Arc`) by every request.
//!
//! Expected layout of the asset directory:
//!
//! ```text
//! templates/simple.png
//! templates/hourly_light.png
//! templates/hourly_dark.png
//! icons/<Icon>.png          large icons
//! icons/128/<Icon>.png      small icons for the hourly strip
//! icons/progress.png        day-progress marker
//! fonts/DejaVuSans-Bold.ttf
//! fonts/DejaVuSansCondensed.ttf
//! fonts/DejaVuSansCondensed-Bold.ttf
//! ```

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use image::RgbaImage;
use rusttype::Font;

use crate::{
    condition::Icon,
    error::{Result, WeatherError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    Simple,
    HourlyLight,
    HourlyDark,
}

impl Template {
    pub const fn all() -> &'static [Template] {
        &[Template::Simple, Template::HourlyLight, Template::HourlyDark]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Template::Simple => "simple.png",
            Template::HourlyLight => "hourly_light.png",
            Template::HourlyDark => "hourly_dark.png",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconSize {
    Large,
    Small,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontKind {
    Bold,
    Condensed,
    BoldCondensed,
}

impl FontKind {
    pub const fn all() -> &'static [FontKind] {
        &[FontKind::Bold, FontKind::Condensed, FontKind::BoldCondensed]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            FontKind::Bold => "DejaVuSans-Bold.ttf",
            FontKind::Condensed => "DejaVuSansCondensed.ttf",
            FontKind::BoldCondensed => "DejaVuSansCondensed-Bold.ttf",
        }
    }
}

pub struct AssetBundle {
    templates: HashMap<Template, RgbaImage>,
    icons: HashMap<(Icon, IconSize), RgbaImage>,
    marker: RgbaImage,
    fonts: HashMap<FontKind, Font<'static>>,
}

impl std::fmt::Debug for AssetBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetBundle")
            .field("templates", &self.templates.len())
            .field("icons", &self.icons.len())
            .field("marker", &self.marker.dimensions())
            .field("fonts", &self.fonts.len())
            .finish()
    }
}

impl AssetBundle {
    pub fn new(
        templates: HashMap<Template, RgbaImage>,
        icons: HashMap<(Icon, IconSize), RgbaImage>,
        marker: RgbaImage,
        fonts: HashMap<FontKind, Font<'static>>,
    ) -> Self {
        Self { templates, icons, marker, fonts }
    }

    /// Loads every template, icon (both sizes), the marker and all fonts from
    /// `dir`. Any missing or undecodable file fails the whole load.
    pub fn load(dir: &Path) -> Result<Self> {
        tracing::info!(dir = %dir.display(), "loading card assets");

        let mut templates = HashMap::new();
        for &template in Template::all() {
            let path = dir.join("templates").join(template.file_name());
            templates.insert(template, load_image(&path)?);
        }

        let mut icons = HashMap::new();
        for &icon in Icon::all() {
            for size in [IconSize::Large, IconSize::Small] {
                icons.insert((icon, size), load_image(&icon_path(dir, icon, size))?);
            }
        }

        let marker = load_image(&dir.join("icons").join("progress.png"))?;

        let mut fonts = HashMap::new();
        for &kind in FontKind::all() {
            let path = dir.join("fonts").join(kind.file_name());
            fonts.insert(kind, load_font(&path)?);
        }

        tracing::debug!(icons = icons.len(), "card assets loaded");
        Ok(Self::new(templates, icons, marker, fonts))
    }

    pub fn template(&self, template: Template) -> Result<&RgbaImage> {
        self.templates
            .get(&template)
            .ok_or_else(|| missing(format!("template {}", template.file_name())))
    }

    pub fn icon(&self, icon: Icon, size: IconSize) -> Result<&RgbaImage> {
        self.icons
            .get(&(icon, size))
            .ok_or_else(|| missing(format!("{size:?} icon {}", icon.file_stem())))
    }

    pub fn marker(&self) -> &RgbaImage {
        &self.marker
    }

    pub fn font(&self, kind: FontKind) -> Result<&Font<'static>> {
        self.fonts.get(&kind).ok_or_else(|| missing(format!("font {}", kind.file_name())))
    }
}

fn icon_path(dir: &Path, icon: Icon, size: IconSize) -> PathBuf {
    let file = format!("{}.png", icon.file_stem());
    match size {
        IconSize::Large => dir.join("icons").join(file),
        IconSize::Small => dir.join("icons").join("128").join(file),
    }
}

fn missing(what: String) -> WeatherError {
    tracing::error!(asset = %what, "asset not present in bundle");
    WeatherError::Asset(what)
}

fn load_image(path: &Path) -> Result<RgbaImage> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|e| WeatherError::Asset(format!("{}: {e}", path.display())))
}

fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes =
        fs::read(path).map_err(|e| WeatherError::Asset(format!("{}: {e}", path.display())))?;
    Font::try_from_vec(bytes)
        .ok_or_else(|| WeatherError::Asset(format!("{}: not a usable font", path.display())))
}
