//! Chapter and verse queries. Content is written only by the importer.

use rusqlite::{params, Connection, OptionalExtension, Result};

use super::now_str;
use crate::domain::{Chapter, Verse};
use crate::scoring::LetterGrade;

/// Insert a chapter and its verses (numbered from 1), returns the chapter ID
pub fn insert_chapter<S: AsRef<str>>(
    conn: &Connection,
    title: &str,
    author: Option<&str>,
    verses: &[S],
) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO chapters (title, author, created_at) VALUES (?1, ?2, ?3)",
        params![title, author, now_str()],
    )?;
    let chapter_id = tx.last_insert_rowid();

    {
        let mut stmt =
            tx.prepare("INSERT INTO verses (chapter_id, number, content) VALUES (?1, ?2, ?3)")?;
        for (i, content) in verses.iter().enumerate() {
            stmt.execute(params![chapter_id, (i + 1) as i64, content.as_ref()])?;
        }
    }

    tx.commit()?;
    Ok(chapter_id)
}

pub fn get_chapter(conn: &Connection, chapter_id: i64) -> Result<Option<Chapter>> {
    conn.query_row(
        "SELECT id, title, author FROM chapters WHERE id = ?1",
        params![chapter_id],
        |row| {
            Ok(Chapter {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
            })
        },
    )
    .optional()
}

pub fn chapter_title_exists(conn: &Connection, title: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM chapters WHERE title = ?1",
        params![title],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Verses of a chapter in reading order
pub fn get_chapter_verses(conn: &Connection, chapter_id: i64) -> Result<Vec<Verse>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT id, chapter_id, number, content
        FROM verses
        WHERE chapter_id = ?1
        ORDER BY number
        "#,
    )?;

    let verses = stmt
        .query_map(params![chapter_id], |row| {
            Ok(Verse {
                id: row.get(0)?,
                chapter_id: row.get(1)?,
                number: row.get(2)?,
                content: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(verses)
}

/// Chapter row for the chapter list, with the user's latest result
#[derive(Debug, Clone)]
pub struct ChapterSummary {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub verse_count: i64,
    pub completed_sessions: i64,
    pub last_score: Option<f64>,
    pub last_grade: Option<LetterGrade>,
}

pub fn list_chapters_for_user(conn: &Connection, user_id: i64) -> Result<Vec<ChapterSummary>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT c.id, c.title, c.author,
                      (SELECT COUNT(*) FROM verses v WHERE v.chapter_id = c.id),
                      (SELECT COUNT(*) FROM memorization_sessions ms
                            WHERE ms.chapter_id = c.id AND ms.user_id = ?1 AND ms.completed_at IS NOT NULL),
                      last.total_score, last.grade
        FROM chapters c
        LEFT JOIN memorization_sessions last ON last.id = (
            SELECT ms.id FROM memorization_sessions ms
            WHERE ms.chapter_id = c.id AND ms.user_id = ?1 AND ms.completed_at IS NOT NULL
            ORDER BY ms.completed_at DESC, ms.id DESC
            LIMIT 1
        )
        ORDER BY c.id
        "#,
    )?;

    let chapters = stmt
        .query_map(params![user_id], |row| {
            let grade: Option<String> = row.get(6)?;
            Ok(ChapterSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                author: row.get(2)?,
                verse_count: row.get(3)?,
                completed_sessions: row.get(4)?,
                last_score: row.get(5)?,
                last_grade: grade.as_deref().and_then(LetterGrade::from_str),
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_insert_and_read_verses_in_order() {
        let env = TestEnv::new().unwrap();
        let id = insert_chapter(
            &env.conn,
            "Ozymandias",
            Some("Percy Bysshe Shelley"),
            &[
                "I met a traveller from an antique land",
                "Who said: Two vast and trunkless legs of stone",
            ],
        )
        .unwrap();

        let chapter = get_chapter(&env.conn, id).unwrap().unwrap();
        assert_eq!(chapter.title, "Ozymandias");
        assert_eq!(chapter.author.as_deref(), Some("Percy Bysshe Shelley"));

        let verses = get_chapter_verses(&env.conn, id).unwrap();
        assert_eq!(verses.len(), 2);
        assert_eq!(verses[0].number, 1);
        assert_eq!(verses[1].number, 2);
        assert!(verses[1].content.starts_with("Who said"));
    }

    #[test]
    fn test_missing_chapter() {
        let env = TestEnv::new().unwrap();
        assert!(get_chapter(&env.conn, 42).unwrap().is_none());
        assert!(get_chapter_verses(&env.conn, 42).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let env = TestEnv::new().unwrap();
        insert_chapter(&env.conn, "Dup", None, &["a"]).unwrap();
        assert!(chapter_title_exists(&env.conn, "Dup").unwrap());
        assert!(insert_chapter(&env.conn, "Dup", None, &["b"]).is_err());
        // Failed insert leaves no stray verses behind
        let verses: i64 = env
            .conn
            .query_row("SELECT COUNT(*) FROM verses", [], |row| row.get(0))
            .unwrap();
        assert_eq!(verses, 1);
    }

    #[test]
    fn test_list_chapters_without_sessions() {
        let env = TestEnv::new().unwrap();
        let user_id = env.create_user("reader");
        insert_chapter(&env.conn, "First", None, &["a b", "c d"]).unwrap();
        insert_chapter(&env.conn, "Second", None, &["e"]).unwrap();

        let list = list_chapters_for_user(&env.conn, user_id).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].verse_count, 2);
        assert_eq!(list[0].completed_sessions, 0);
        assert!(list[0].last_grade.is_none());
        assert_eq!(list[1].title, "Second");
    }
}
