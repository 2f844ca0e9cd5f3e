//! Locating the wallpaper workshop folder and linking items to their
//! catalog page.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::error::{CoreError, CoreResult};

/// Steam application id of Wallpaper Engine.
pub const WORKSHOP_APP_ID: &str = "431960";

const CATALOG_URL_PREFIX: &str = "https://steamcommunity.com/sharedfiles/filedetails/?id=";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopLocation {
    pub install_path: PathBuf,
    pub workshop_path: PathBuf,
}

/// Builds the catalog page URL for a workshop item id.
pub fn catalog_url(external_id: &str) -> CoreResult<String> {
    let id = external_id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::InvalidCatalogId(external_id.to_string()));
    }
    Ok(format!("{CATALOG_URL_PREFIX}{id}"))
}

/// `<library>/steamapps/workshop/content/431960`
pub fn workshop_dir_in(library: &Path) -> PathBuf {
    library
        .join("steamapps")
        .join("workshop")
        .join("content")
        .join(WORKSHOP_APP_ID)
}

/// Well-known Steam install locations for this platform.
pub fn default_install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if cfg!(windows) {
        for p in [
            r"C:\Program Files (x86)\Steam",
            r"C:\Program Files\Steam",
            r"D:\Steam",
            r"E:\Steam",
            r"F:\SteamLibrary",
            r"G:\SteamLibrary",
        ] {
            candidates.push(PathBuf::from(p));
        }
    } else if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".steam").join("steam"));
        candidates.push(home.join(".local").join("share").join("Steam"));
        candidates.push(home.join("Library").join("Application Support").join("Steam"));
    }

    candidates
}

fn library_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""path"\s+"((?:[^"\\]|\\.)*)""#).expect("library path pattern is valid")
    })
}

/// Extracts library folder paths from the contents of `libraryfolders.vdf`.
pub fn parse_library_folders(vdf: &str) -> Vec<PathBuf> {
    library_path_regex()
        .captures_iter(vdf)
        .filter_map(|c| c.get(1))
        .map(|m| PathBuf::from(m.as_str().replace(r"\\", r"\")))
        .collect()
}

/// Checks each install candidate, then every library it lists, and returns
/// the first workshop folder that exists.
pub fn detect_in(candidates: &[PathBuf]) -> Option<WorkshopLocation> {
    for install in candidates {
        let direct = workshop_dir_in(install);
        if direct.is_dir() {
            return Some(WorkshopLocation {
                install_path: install.clone(),
                workshop_path: direct,
            });
        }

        let vdf = install.join("steamapps").join("libraryfolders.vdf");
        let Ok(content) = fs::read_to_string(&vdf) else {
            continue;
        };
        for library in parse_library_folders(&content) {
            let workshop = workshop_dir_in(&library);
            if workshop.is_dir() {
                return Some(WorkshopLocation {
                    install_path: install.clone(),
                    workshop_path: workshop,
                });
            }
        }
    }
    None
}

pub fn detect_workshop() -> Option<WorkshopLocation> {
    let found = detect_in(&default_install_candidates());
    match &found {
        Some(location) => tracing::info!("Workshop folder detected at {:?}", location.workshop_path),
        None => tracing::info!("No workshop folder found in default locations"),
    }
    found
}
