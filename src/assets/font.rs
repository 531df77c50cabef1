use std::path::{Path, PathBuf};

use crate::foundation::error::{ProtectorError, ProtectorResult};

/// Environment variable naming a font file to use when none is passed explicitly.
pub const FONT_ENV_VAR: &str = "DIGIPROTECTOR_FONT";

/// Bold sans-serif faces tried in order when neither an explicit path nor the env var is set.
///
/// The resolved face is drawn as-is; nothing is synthetically emboldened, so explicit fonts
/// should be bold faces too.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSansBold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Raw font file bytes plus where they came from.
#[derive(Clone, Debug)]
pub struct FontSource {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Resolve the watermark face: explicit path, then `DIGIPROTECTOR_FONT`, then well-known system
/// locations.
pub fn resolve_font(explicit: Option<&Path>) -> ProtectorResult<FontSource> {
    if let Some(p) = explicit {
        return load_font(p);
    }

    if let Some(p) = std::env::var_os(FONT_ENV_VAR).filter(|v| !v.is_empty()) {
        return load_font(Path::new(&p));
    }

    for candidate in SYSTEM_FONT_CANDIDATES {
        let p = Path::new(candidate);
        if p.is_file() {
            return load_font(p);
        }
    }

    Err(ProtectorError::font(format!(
        "no sans-serif font found; pass a font path or set {FONT_ENV_VAR}"
    )))
}

pub fn load_font(path: &Path) -> ProtectorResult<FontSource> {
    let bytes = std::fs::read(path).map_err(|e| {
        ProtectorError::font(format!("failed to read font '{}': {e}", path.display()))
    })?;
    if bytes.len() < 12 {
        return Err(ProtectorError::font(format!(
            "font '{}' is too short to be a font file",
            path.display()
        )));
    }
    tracing::debug!(path = %path.display(), len = bytes.len(), "resolved watermark font");
    Ok(FontSource {
        path: path.to_path_buf(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_path_is_a_font_error() {
        let err = resolve_font(Some(Path::new("target/definitely/missing.ttf"))).unwrap_err();
        assert!(matches!(err, ProtectorError::Font(_)));
        assert!(err.to_string().contains("missing.ttf"));
    }

    #[test]
    fn truncated_file_is_rejected() {
        let dir = PathBuf::from("target").join("font_unit");
        std::fs::create_dir_all(&dir).unwrap();
        let p = dir.join("tiny.ttf");
        std::fs::write(&p, b"abc").unwrap();
        assert!(load_font(&p).is_err());
    }
}
