//! Chapter import from a TOML content file.
//!
//! ```toml
//! [[chapter]]
//! title = "Ozymandias"
//! author = "Percy Bysshe Shelley"
//! verses = ["I met a traveller from an antique land", "..."]
//! ```
//!
//! Verses are numbered from 1 in file order. Chapters are matched by title,
//! so importing the same file twice changes nothing.

use rusqlite::Connection;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::db;

#[derive(Debug, Deserialize)]
struct ChapterFile {
    #[serde(default)]
    chapter: Vec<ChapterEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChapterEntry {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub verses: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error reading {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("parse error in {0}: {1}")]
    Parse(String, #[source] toml::de::Error),
    #[error("chapter {0:?} has no verses")]
    EmptyChapter(String),
    #[error("chapter with a blank title")]
    BlankTitle,
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

/// Result of one import run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Chapters inserted
    pub inserted: usize,
    /// Chapters already present by title
    pub skipped: usize,
}

/// Parse chapter definitions from TOML text.
pub fn parse_chapters(source: &str, origin: &str) -> Result<Vec<ChapterEntry>, ContentError> {
    let file: ChapterFile =
        toml::from_str(source).map_err(|e| ContentError::Parse(origin.to_string(), e))?;

    for entry in &file.chapter {
        if entry.title.trim().is_empty() {
            return Err(ContentError::BlankTitle);
        }
        if entry.verses.iter().all(|v| v.trim().is_empty()) {
            return Err(ContentError::EmptyChapter(entry.title.clone()));
        }
    }

    Ok(file.chapter)
}

/// Insert chapters whose title is not in the database yet.
pub fn import_chapters(conn: &Connection, chapters: &[ChapterEntry]) -> Result<ImportResult, ContentError> {
    let mut result = ImportResult::default();

    for entry in chapters {
        let title = entry.title.trim();
        if db::chapter_title_exists(conn, title)? {
            result.skipped += 1;
            continue;
        }

        let verses: Vec<&str> = entry
            .verses
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect();
        if verses.is_empty() {
            return Err(ContentError::EmptyChapter(entry.title.clone()));
        }

        db::insert_chapter(conn, title, entry.author.as_deref(), &verses)?;
        tracing::info!("Imported chapter {:?} ({} verses)", title, verses.len());
        result.inserted += 1;
    }

    Ok(result)
}

/// Read a content file and import it.
pub fn import_file(conn: &Connection, path: &Path) -> Result<ImportResult, ContentError> {
    let origin = path.display().to_string();
    let source = fs::read_to_string(path).map_err(|e| ContentError::Io(origin.clone(), e))?;
    let chapters = parse_chapters(&source, &origin)?;
    import_chapters(conn, &chapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    const SAMPLE: &str = r#"
[[chapter]]
title = "Roses"
verses = ["roses are red", "violets are blue"]

[[chapter]]
title = "Ozymandias"
author = "Percy Bysshe Shelley"
verses = [
  "I met a traveller from an antique land",
  "   ",
  "Who said: Two vast and trunkless legs of stone",
]
"#;

    #[test]
    fn test_parse_chapters() {
        let chapters = parse_chapters(SAMPLE, "sample").unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].author, None);
        assert_eq!(chapters[1].author.as_deref(), Some("Percy Bysshe Shelley"));
    }

    #[test]
    fn test_import_is_idempotent() {
        let env = TestEnv::new().unwrap();
        let chapters = parse_chapters(SAMPLE, "sample").unwrap();

        let first = import_chapters(&env.conn, &chapters).unwrap();
        assert_eq!(first, ImportResult { inserted: 2, skipped: 0 });

        let second = import_chapters(&env.conn, &chapters).unwrap();
        assert_eq!(second, ImportResult { inserted: 0, skipped: 2 });

        let count: i64 = env
            .conn
            .query_row("SELECT COUNT(*) FROM chapters", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_blank_verses_dropped() {
        let env = TestEnv::new().unwrap();
        let chapters = parse_chapters(SAMPLE, "sample").unwrap();
        import_chapters(&env.conn, &chapters).unwrap();

        let summaries = db::list_chapters_for_user(&env.conn, env.create_user("reader")).unwrap();
        let ozymandias = summaries.iter().find(|c| c.title == "Ozymandias").unwrap();
        assert_eq!(ozymandias.verse_count, 2);
    }

    #[test]
    fn test_empty_chapter_rejected() {
        let source = "[[chapter]]\ntitle = \"Nothing\"\nverses = []\n";
        assert!(matches!(
            parse_chapters(source, "inline"),
            Err(ContentError::EmptyChapter(title)) if title == "Nothing"
        ));
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(
            parse_chapters("[[chapter]]\ntitle = ", "inline"),
            Err(ContentError::Parse(..))
        ));
    }

    #[test]
    fn test_import_file() {
        let env = TestEnv::new().unwrap();
        let path = env.path().join("chapters.toml");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(import_file(&env.conn, &path).unwrap().inserted, 2);
        assert!(matches!(
            import_file(&env.conn, &env.path().join("missing.toml")),
            Err(ContentError::Io(..))
        ));
    }
}
