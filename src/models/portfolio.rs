use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four fixed service categories a portfolio item can belong to.
///
/// The category determines where uploads land at the asset host
/// (`portfolio/{category}`) and which media kind the primary file is
/// expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceCategory {
    VideoEditing,
    GraphicsDesign,
    #[serde(rename = "3d-animation")]
    Animation3d,
    WebsiteDevelopment,
}

impl ServiceCategory {
    pub const ALL: [Self; 4] = [
        Self::VideoEditing,
        Self::GraphicsDesign,
        Self::Animation3d,
        Self::WebsiteDevelopment,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VideoEditing => "video-editing",
            Self::GraphicsDesign => "graphics-design",
            Self::Animation3d => "3d-animation",
            Self::WebsiteDevelopment => "website-development",
        }
    }

    /// Media kind convention: the video-oriented categories store videos,
    /// everything else stores images. Applied at creation time only.
    #[must_use]
    pub const fn file_kind(self) -> FileKind {
        match self {
            Self::VideoEditing | Self::Animation3d => FileKind::Video,
            Self::GraphicsDesign | Self::WebsiteDevelopment => FileKind::Image,
        }
    }

    /// Asset-host folder for primary uploads of this category.
    #[must_use]
    pub fn upload_folder(self) -> String {
        format!("portfolio/{}", self.as_str())
    }

    /// Asset-host folder for thumbnails of this category.
    #[must_use]
    pub fn thumbnail_folder(self) -> String {
        format!("portfolio/{}/thumbnails", self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video-editing" => Ok(Self::VideoEditing),
            "graphics-design" => Ok(Self::GraphicsDesign),
            "3d-animation" => Ok(Self::Animation3d),
            "website-development" => Ok(Self::WebsiteDevelopment),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media kind of a stored asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
}

impl FileKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl FromStr for FileKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a comma-separated technologies field into trimmed, non-empty tags.
#[must_use]
pub fn parse_technologies(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            "video-editing".parse::<ServiceCategory>(),
            Ok(ServiceCategory::VideoEditing)
        );
        assert_eq!(
            "3d-animation".parse::<ServiceCategory>(),
            Ok(ServiceCategory::Animation3d)
        );
        assert!("photography".parse::<ServiceCategory>().is_err());
        assert!("".parse::<ServiceCategory>().is_err());
    }

    #[test]
    fn test_file_kind_convention() {
        assert_eq!(ServiceCategory::VideoEditing.file_kind(), FileKind::Video);
        assert_eq!(ServiceCategory::Animation3d.file_kind(), FileKind::Video);
        assert_eq!(ServiceCategory::GraphicsDesign.file_kind(), FileKind::Image);
        assert_eq!(
            ServiceCategory::WebsiteDevelopment.file_kind(),
            FileKind::Image
        );
    }

    #[test]
    fn test_upload_folders() {
        assert_eq!(
            ServiceCategory::GraphicsDesign.upload_folder(),
            "portfolio/graphics-design"
        );
        assert_eq!(
            ServiceCategory::VideoEditing.thumbnail_folder(),
            "portfolio/video-editing/thumbnails"
        );
    }

    #[test]
    fn test_parse_technologies() {
        assert_eq!(
            parse_technologies("After Effects, Blender , ,Premiere"),
            vec!["After Effects", "Blender", "Premiere"]
        );
        assert!(parse_technologies("").is_empty());
        assert!(parse_technologies(" , ,").is_empty());
    }
}
