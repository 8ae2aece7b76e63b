//! Installable web-app metadata: the `/api/manifest` document and the
//! `<head>` tags every page carries.

use serde::Serialize;

pub const APP_NAME: &str = "Family Directory";
pub const SHORT_NAME: &str = "Family";
pub const DESCRIPTION: &str = "Contact details, birthdays and photos for the whole family.";
pub const THEME_COLOR: &str = "#2f6f4f";
pub const BACKGROUND_COLOR: &str = "#ffffff";
pub const MANIFEST_PATH: &str = "/api/manifest";

/// Square icon sizes shipped under `static/icons`.
pub const ICON_SIZES: [u32; 6] = [72, 96, 144, 192, 384, 512];
const APPLE_TOUCH_ICON_SIZE: u32 = 192;

pub const MANIFEST_CONTENT_TYPE: &str = "application/manifest+json";
pub const MANIFEST_CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebManifest {
    pub name: &'static str,
    pub short_name: &'static str,
    pub description: &'static str,
    pub start_url: &'static str,
    pub display: &'static str,
    pub background_color: &'static str,
    pub theme_color: &'static str,
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: &'static str,
    pub purpose: &'static str,
}

pub fn icon_path(size: u32) -> String {
    format!("/static/icons/icon-{size}x{size}.png")
}

fn icon(size: u32) -> ManifestIcon {
    ManifestIcon {
        src: icon_path(size),
        sizes: format!("{size}x{size}"),
        mime_type: "image/png",
        purpose: "any maskable",
    }
}

pub fn manifest() -> WebManifest {
    WebManifest {
        name: APP_NAME,
        short_name: SHORT_NAME,
        description: DESCRIPTION,
        start_url: "/",
        display: "standalone",
        background_color: BACKGROUND_COLOR,
        theme_color: THEME_COLOR,
        icons: ICON_SIZES.iter().copied().map(icon).collect(),
    }
}

/// Values rendered into the shared page `<head>`.
#[derive(Debug, Clone)]
pub struct HeadMetadata {
    pub title: String,
    pub description: &'static str,
    pub theme_color: &'static str,
    pub manifest_href: &'static str,
    pub apple_touch_icon: String,
}

impl HeadMetadata {
    pub fn titled(page: &str) -> Self {
        Self {
            title: format!("{page} · {APP_NAME}"),
            ..Self::default()
        }
    }
}

impl Default for HeadMetadata {
    fn default() -> Self {
        Self {
            title: APP_NAME.to_string(),
            description: DESCRIPTION,
            theme_color: THEME_COLOR,
            manifest_href: MANIFEST_PATH,
            apple_touch_icon: icon_path(APPLE_TOUCH_ICON_SIZE),
        }
    }
}
