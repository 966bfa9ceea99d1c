use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use usvg::fontdb;

use crate::foundation::error::{ShortsError, ShortsResult};

/// Raw font file bytes plus the face index inside the file (non-zero for collections).
#[derive(Clone, Debug)]
pub struct FontFace {
    pub bytes: Arc<Vec<u8>>,
    pub index: u32,
}

/// Where the face in a [`FontBook`] came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FontOrigin {
    /// The configured custom font file.
    Custom(PathBuf),
    /// A platform font found through the system font database.
    System(String),
    /// Neither was usable; text is skipped.
    Unavailable,
}

/// The font used for every text block, resolved once per process.
///
/// Resolution order is custom file, then the system sans-serif face, then nothing. Failing to
/// find a font is never an error: callers degrade to drawing no text.
#[derive(Clone, Debug)]
pub struct FontBook {
    face: Option<FontFace>,
    origin: FontOrigin,
}

impl FontBook {
    /// Resolve the configured font, falling back to a system face.
    pub fn load(custom: Option<&Path>) -> Self {
        if let Some(path) = custom {
            match load_custom(path) {
                Ok(face) => {
                    info!(path = %path.display(), "using custom font");
                    return Self {
                        face: Some(face),
                        origin: FontOrigin::Custom(path.to_path_buf()),
                    };
                }
                Err(e) => warn!(path = %path.display(), error = %e, "custom font unavailable"),
            }
        }

        match system_face() {
            Some((face, family)) => {
                warn!(%family, "falling back to system font");
                Self {
                    face: Some(face),
                    origin: FontOrigin::System(family),
                }
            }
            None => {
                warn!("no usable font found; text blocks will not be drawn");
                Self::unavailable()
            }
        }
    }

    /// Build a book from in-memory font bytes.
    pub fn from_bytes(bytes: Vec<u8>, origin: FontOrigin) -> ShortsResult<Self> {
        ensure_has_faces(&bytes)?;
        Ok(Self {
            face: Some(FontFace {
                bytes: Arc::new(bytes),
                index: 0,
            }),
            origin,
        })
    }

    /// A book with no face at all.
    pub fn unavailable() -> Self {
        Self {
            face: None,
            origin: FontOrigin::Unavailable,
        }
    }

    pub fn face(&self) -> Option<&FontFace> {
        self.face.as_ref()
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.origin
    }
}

fn load_custom(path: &Path) -> ShortsResult<FontFace> {
    let bytes = std::fs::read(path)
        .map_err(|e| ShortsError::composition(format!("read '{}': {e}", path.display())))?;
    ensure_has_faces(&bytes)?;
    Ok(FontFace {
        bytes: Arc::new(bytes),
        index: 0,
    })
}

fn ensure_has_faces(bytes: &[u8]) -> ShortsResult<()> {
    let mut db = fontdb::Database::new();
    db.load_font_data(bytes.to_vec());
    if db.faces().next().is_none() {
        return Err(ShortsError::composition("font data contains no usable faces"));
    }
    Ok(())
}

fn system_face() -> Option<(FontFace, String)> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let families = [
        fontdb::Family::SansSerif,
        fontdb::Family::Serif,
        fontdb::Family::Monospace,
    ];
    let query = fontdb::Query {
        families: &families,
        weight: fontdb::Weight::NORMAL,
        stretch: fontdb::Stretch::Normal,
        style: fontdb::Style::Normal,
    };
    let id = db
        .query(&query)
        .or_else(|| db.faces().next().map(|f| f.id))?;
    let family = db
        .face(id)
        .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
        .unwrap_or_default();
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;

    Some((
        FontFace {
            bytes: Arc::new(bytes),
            index,
        },
        family,
    ))
}
