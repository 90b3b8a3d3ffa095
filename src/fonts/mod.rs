//! Font loading for the form renderer.
//!
//! The form is set in Liberation Sans. Font files are looked up once per process and their
//! bytes cached; every render call builds its own `genpdf` font family from the cache.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::warn;

/// Name of the font family used by the form.
pub const FONT_FAMILY_NAME: &str = "LiberationSans";

/// Overrides the directory holding the bundled font files.
pub const FONTS_DIR_ENV: &str = "FGNSB_FONTS_DIR";
/// Overrides the system directory searched when no bundled fonts are found.
pub const SYSTEM_FONTS_DIR_ENV: &str = "FGNSB_SYSTEM_FONTS_DIR";

const FONT_FILES: [&str; 4] = [
    "LiberationSans-Regular.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Italic.ttf",
    "LiberationSans-BoldItalic.ttf",
];

const SYSTEM_FONT_DIRECTORIES: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation",
    "/usr/local/share/fonts/liberation",
];

/// Raw bytes of the four styles, in `FONT_FILES` order.
struct FontBytes {
    files: [Vec<u8>; 4],
}

static FONT_BYTES: OnceLock<FontBytes> = OnceLock::new();

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn bundled_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn system_directory_candidates() -> Vec<PathBuf> {
    match env_path(SYSTEM_FONTS_DIR_ENV) {
        Some(path) => vec![path],
        None => SYSTEM_FONT_DIRECTORIES.iter().map(PathBuf::from).collect(),
    }
}

fn missing_font_files(path: &Path) -> Vec<&'static str> {
    FONT_FILES
        .iter()
        .copied()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

/// First candidate holding every font file, plus a note for each rejected candidate.
fn find_directory(candidates: &[PathBuf]) -> Result<PathBuf, Vec<String>> {
    let mut attempts = Vec::new();
    for candidate in candidates {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }
        let missing = missing_font_files(candidate);
        if missing.is_empty() {
            return Ok(candidate.clone());
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }
    Err(attempts)
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let bundled = match find_directory(&bundled_directory_candidates()) {
        Ok(directory) => return Ok(directory),
        Err(attempts) => attempts,
    };

    match find_directory(&system_directory_candidates()) {
        Ok(directory) => {
            warn!(
                "Bundled fonts unavailable ({}); falling back to system '{}' fonts in {}.",
                bundled.join(", "),
                FONT_FAMILY_NAME,
                directory.display()
            );
            Ok(directory)
        }
        Err(system) => Err(Error::new(
            format!(
                "Unable to locate the {} fonts. Checked: {}. Set {} or install Liberation Sans.",
                FONT_FAMILY_NAME,
                bundled
                    .iter()
                    .chain(system.iter())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
                FONTS_DIR_ENV
            ),
            io::Error::new(io::ErrorKind::NotFound, "form fonts not found"),
        )),
    }
}

fn read_font_bytes(directory: &Path) -> Result<FontBytes, Error> {
    let read = |name: &str| {
        let path = directory.join(name);
        fs::read(&path).map_err(|err| {
            Error::new(
                format!("Failed to read font file {}: {}", path.display(), err),
                err,
            )
        })
    };
    Ok(FontBytes {
        files: [
            read(FONT_FILES[0])?,
            read(FONT_FILES[1])?,
            read(FONT_FILES[2])?,
            read(FONT_FILES[3])?,
        ],
    })
}

fn cached_font_bytes() -> Result<&'static FontBytes, Error> {
    if let Some(bytes) = FONT_BYTES.get() {
        return Ok(bytes);
    }
    let directory = resolve_font_directory()?;
    log::debug!("loading {} fonts from {}", FONT_FAMILY_NAME, directory.display());
    let bytes = read_font_bytes(&directory)?;
    // A concurrent first call may have won the race; either value is equivalent.
    let _ = FONT_BYTES.set(bytes);
    FONT_BYTES.get().ok_or_else(|| {
        Error::new(
            "font cache could not be initialised",
            ErrorKind::Internal,
        )
    })
}

fn font_data(bytes: &[u8], style: &str) -> Result<FontData, Error> {
    FontData::new(bytes.to_vec(), None).map_err(|err| {
        Error::new(
            format!("Failed to parse {} {} font: {}", FONT_FAMILY_NAME, style, err),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

/// Builds a fresh `genpdf` font family from the cached font bytes.
///
/// The first call reads the font files; later calls only copy bytes.
pub fn font_family() -> Result<FontFamily<FontData>, Error> {
    let bytes = cached_font_bytes()?;
    let [regular, bold, italic, bold_italic] = &bytes.files;
    Ok(FontFamily {
        regular: font_data(regular, "regular")?,
        bold: font_data(bold, "bold")?,
        italic: font_data(italic, "italic")?,
        bold_italic: font_data(bold_italic, "bold italic")?,
    })
}

/// Whether the form fonts can be found, either bundled or on the system.
pub fn fonts_available() -> bool {
    FONT_BYTES.get().is_some() || resolve_font_directory().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_search_reports_every_attempt() {
        let missing = PathBuf::from("/definitely/not/a/font/dir");
        let attempts = find_directory(&[missing]).unwrap_err();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].contains("directory missing"));
    }

    #[test]
    fn incomplete_directory_lists_missing_files() {
        let dir = env::temp_dir();
        let attempts = find_directory(&[dir]).unwrap_err();
        assert!(attempts[0].contains("LiberationSans-BoldItalic.ttf"));
    }
}
