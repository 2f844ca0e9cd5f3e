//! Reads a wallpaper folder's `project.json` into a [`MetadataRecord`].

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::error::{CoreError, CoreResult};
use super::metadata::{MetadataRecord, PreviewKind, WallpaperType};

const PROJECT_FILE: &str = "project.json";

/// Checked in order; the first file that exists wins.
const PREVIEW_CANDIDATES: [(&str, PreviewKind); 5] = [
    ("preview.mp4", PreviewKind::Video),
    ("preview.gif", PreviewKind::AnimatedImage),
    ("preview.jpg", PreviewKind::Image),
    ("preview.png", PreviewKind::Image),
    ("preview.jpeg", PreviewKind::Image),
];

pub fn read_project_json(folder: &Path) -> CoreResult<MetadataRecord> {
    let project_path = folder.join(PROJECT_FILE);
    if !project_path.is_file() {
        return Err(CoreError::metadata(folder, "project.json not found"));
    }

    let content =
        fs::read_to_string(&project_path).map_err(|e| CoreError::metadata(folder, e))?;
    let project: Value = serde_json::from_str(&content)
        .map_err(|e| CoreError::metadata(folder, format!("invalid project.json: {e}")))?;
    if !project.is_object() {
        return Err(CoreError::metadata(folder, "project.json is not an object"));
    }

    let (preview_path, preview_kind) = match find_preview(folder) {
        Some((path, kind)) => (Some(path), kind),
        None => (None, PreviewKind::default()),
    };

    // Each field falls back on its own; a mistyped field never costs the others.
    Ok(MetadataRecord {
        title: text_field(&project, "title"),
        description: text_field(&project, "description"),
        tags: project
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        wallpaper_type: WallpaperType::parse(
            project.get("type").and_then(Value::as_str).unwrap_or("scene"),
        ),
        preview_path,
        preview_kind,
        external_id: workshop_id(&project),
    })
}

/// A non-empty string field, or `None` when absent or of another type.
fn text_field(project: &Value, key: &str) -> Option<String> {
    project
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Workshop ids show up both as strings and as bare numbers.
fn workshop_id(project: &Value) -> Option<String> {
    match project.get("workshopid")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

fn find_preview(folder: &Path) -> Option<(std::path::PathBuf, PreviewKind)> {
    PREVIEW_CANDIDATES.iter().find_map(|(name, kind)| {
        let path = folder.join(name);
        path.is_file().then_some((path, *kind))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_project_json() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("project.json"),
            r#"{
                "title": "Test Wallpaper",
                "description": "A test wallpaper",
                "type": "video",
                "tags": ["anime", "cute", 7],
                "workshopid": "123456789"
            }"#,
        )
        .unwrap();
        fs::write(temp.path().join("preview.jpg"), b"jpg").unwrap();
        fs::write(temp.path().join("preview.gif"), b"gif").unwrap();

        let record = read_project_json(temp.path()).unwrap();
        assert_eq!(record.title.as_deref(), Some("Test Wallpaper"));
        assert_eq!(record.wallpaper_type, WallpaperType::Video);
        assert_eq!(record.external_id.as_deref(), Some("123456789"));
        assert_eq!(record.tags, vec!["anime", "cute"]);
        assert_eq!(record.preview_kind, PreviewKind::AnimatedImage);
        assert_eq!(record.preview_path, Some(temp.path().join("preview.gif")));
    }

    #[test]
    fn numeric_workshop_id_and_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("project.json"), r#"{"workshopid": 42}"#).unwrap();

        let record = read_project_json(temp.path()).unwrap();
        assert_eq!(record.external_id.as_deref(), Some("42"));
        assert_eq!(record.wallpaper_type, WallpaperType::Scene);
        assert_eq!(record.title, None);
        assert_eq!(record.preview_path, None);
    }

    #[test]
    fn mistyped_fields_fall_back_individually() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("project.json"),
            r#"{"title": "Rain", "type": "video", "tags": "anime", "workshopid": "42"}"#,
        )
        .unwrap();

        let record = read_project_json(temp.path()).unwrap();
        assert_eq!(record.title.as_deref(), Some("Rain"));
        assert_eq!(record.wallpaper_type, WallpaperType::Video);
        assert!(record.tags.is_empty());
        assert_eq!(record.external_id.as_deref(), Some("42"));

        fs::write(
            temp.path().join("project.json"),
            r#"{"title": 5, "type": "scene", "workshopid": true}"#,
        )
        .unwrap();
        fs::write(temp.path().join("preview.png"), b"png").unwrap();

        let record = read_project_json(temp.path()).unwrap();
        assert_eq!(record.title, None);
        assert_eq!(record.wallpaper_type, WallpaperType::Scene);
        assert_eq!(record.external_id, None);
        assert_eq!(record.preview_path, Some(temp.path().join("preview.png")));
    }

    #[test]
    fn missing_or_broken_file_is_a_metadata_error() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            read_project_json(temp.path()),
            Err(CoreError::Metadata { .. })
        ));

        fs::write(temp.path().join("project.json"), "{ not json").unwrap();
        assert!(matches!(
            read_project_json(temp.path()),
            Err(CoreError::Metadata { .. })
        ));

        fs::write(temp.path().join("project.json"), "[1, 2]").unwrap();
        assert!(matches!(
            read_project_json(temp.path()),
            Err(CoreError::Metadata { .. })
        ));
    }
}
