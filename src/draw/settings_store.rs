use crate::draw::settings::SurfaceSettings;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

pub const SURFACE_SETTINGS_FILE_NAME: &str = "sketch_settings.json";

pub fn settings_path_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    let parent = exe_path
        .parent()
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))?;
    Ok(parent.join(SURFACE_SETTINGS_FILE_NAME))
}

pub fn resolve_settings_path() -> Result<PathBuf> {
    let exe_path = std::env::current_exe().context("resolve current executable")?;
    settings_path_from_exe_path(&exe_path)
}

pub fn load() -> Result<SurfaceSettings> {
    load_from_path(&resolve_settings_path()?)
}

pub fn save(settings: &SurfaceSettings) -> Result<PathBuf> {
    let path = resolve_settings_path()?;
    save_to_path(&path, settings)?;
    Ok(path)
}

/// Missing or empty files yield defaults.
pub fn load_from_path(path: &Path) -> Result<SurfaceSettings> {
    if !path.exists() {
        return Ok(SurfaceSettings::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read surface settings file {}", path.display()))?;

    if content.trim().is_empty() {
        return Ok(SurfaceSettings::default());
    }

    let mut loaded: SurfaceSettings = serde_json::from_str(&content)
        .with_context(|| format!("deserialize surface settings file {}", path.display()))?;
    loaded.sanitize();
    Ok(loaded)
}

pub fn save_to_path(path: &Path, settings: &SurfaceSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create settings parent folder {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(settings).context("serialize surface settings")?;
    std::fs::write(path, json)
        .with_context(|| format!("write surface settings file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::model::Theme;

    #[test]
    fn settings_file_is_sibling_of_exe() {
        let exe = Path::new("/tmp/app/bin/sketch_calc");
        let path = settings_path_from_exe_path(exe).expect("path");
        assert_eq!(path, Path::new("/tmp/app/bin").join(SURFACE_SETTINGS_FILE_NAME));
    }

    #[test]
    fn missing_and_blank_files_load_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SURFACE_SETTINGS_FILE_NAME);
        assert_eq!(
            load_from_path(&path).expect("missing"),
            SurfaceSettings::default()
        );

        std::fs::write(&path, "  \n").expect("write");
        assert_eq!(
            load_from_path(&path).expect("blank"),
            SurfaceSettings::default()
        );
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(SURFACE_SETTINGS_FILE_NAME);
        let settings = SurfaceSettings {
            theme: Theme::Dark,
            history_limit: Some(50),
            recognizer_url: "http://calc.internal:9000".into(),
            ..SurfaceSettings::default()
        };

        save_to_path(&path, &settings).expect("save");
        assert_eq!(load_from_path(&path).expect("load"), settings);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SURFACE_SETTINGS_FILE_NAME);
        std::fs::write(&path, "{ not json").expect("write");
        let err = load_from_path(&path).expect_err("malformed");
        assert!(format!("{err:#}").contains(SURFACE_SETTINGS_FILE_NAME));
    }
}
