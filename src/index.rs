use std::{fs::OpenOptions, io::BufWriter, path::Path};

use anyhow::Context;
use log::info;
use serde::Serialize;

// Field order is the order in index.json.
#[derive(Serialize, Debug, Clone)]
pub(crate) struct IndexEntry {
    pub title: String,
    pub description: String,
    pub date: String,
    pub tags: Vec<String>,
    pub category: String,
    pub filename: String,
}

impl IndexEntry {
    pub fn new(
        title: String,
        description: String,
        date: String,
        tags: Vec<String>,
        filename: String,
    ) -> Self {
        let category = derive_category(&filename, &tags);
        Self {
            title,
            description,
            date,
            tags,
            category,
            filename,
        }
    }
}

// The category a post declares in its frontmatter is not trusted here; it is
// re-derived from the output filename and the tag set.
fn derive_category(filename: &str, tags: &[String]) -> String {
    let lowered = filename.to_lowercase();
    if lowered.contains("conference") || tags.iter().any(|tag| tag == "conference") {
        "Conference".to_string()
    } else if lowered.contains("talk") || tags.iter().any(|tag| tag == "talk") {
        "Talk".to_string()
    } else {
        "General".to_string()
    }
}

/// Writes `index.json` into `posts_dir`, newest entry first.
///
/// Dates are compared as plain strings. For the usual YYYY-MM-DD values that
/// equals calendar order.
pub(crate) fn update_index(posts_dir: &Path, mut entries: Vec<IndexEntry>) -> anyhow::Result<()> {
    entries.sort_by(|a, b| b.date.cmp(&a.date));

    let index_path = posts_dir.join("index.json");
    let fd = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&index_path)
        .with_context(|| format!("while opening {:?}", index_path))?;
    let writer = BufWriter::new(fd);
    serde_json::to_writer_pretty(writer, &entries)?;
    info!("index.json now lists {} posts", entries.len());

    Ok(())
}
