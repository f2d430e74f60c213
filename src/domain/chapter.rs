use serde::{Deserialize, Serialize};

/// A poem, practiced as one ordered run of verses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    pub id: i64,
    pub chapter_id: i64,
    /// 1-based position inside the chapter
    pub number: i64,
    pub content: String,
}
