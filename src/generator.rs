use std::{
    fs::{self, OpenOptions},
    path::Path,
};

use anyhow::Context;
use chrono::Local;
use handlebars::Handlebars;
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    frontmatter,
    index::{self, IndexEntry},
    markdown,
};

#[derive(Serialize, Debug)]
struct PostPageData {
    title: String,
    description: String,
    date: String,
    tags: Value,
    category: String,
    content: String,
}

/// Converts every `*.md` file in `markdown_dir` into an HTML page in
/// `posts_dir`, then rewrites the index.
///
/// A missing markdown directory is not an error: the run prints a diagnostic
/// and writes nothing.
pub(crate) fn generate(
    markdown_dir: &Path,
    posts_dir: &Path,
    handlebars: &Handlebars,
) -> anyhow::Result<()> {
    if !markdown_dir.is_dir() {
        println!("Markdown directory not found: {}", markdown_dir.display());
        return Ok(());
    }

    fs::create_dir_all(posts_dir)
        .with_context(|| format!("while creating {:?}", posts_dir))?;

    let mut entries = vec![];
    for entry in fs::read_dir(markdown_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "md") {
            continue;
        }
        println!("Converting {}...", entry.file_name().to_string_lossy());

        let content =
            fs::read_to_string(&path).with_context(|| format!("while reading {:?}", path))?;
        let (metadata, body) = frontmatter::parse(&content);
        debug!("{:?}: {} metadata keys", path, metadata.len());

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let data = resolve_page_data(&metadata, &stem, markdown::to_html(&body));

        let html_name = format!("{stem}.html");
        let out_path = posts_dir.join(&html_name);
        let fd = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&out_path)
            .with_context(|| format!("while opening {:?}", out_path))?;
        handlebars
            .render_to_write("post", &data, fd)
            .with_context(|| format!("while generating {:?}", out_path))?;

        let tags = index_tags(&data.tags);
        entries.push(IndexEntry::new(
            data.title,
            data.description,
            data.date,
            tags,
            html_name.clone(),
        ));
        println!("  → {html_name}");
    }

    let converted = entries.len();
    println!("Updating index.json...");
    index::update_index(posts_dir, entries)?;

    println!("\nConverted {converted} markdown files to HTML");
    Ok(())
}

fn resolve_page_data(metadata: &Map<String, Value>, stem: &str, content: String) -> PostPageData {
    let scalar = |key: &str| {
        metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    PostPageData {
        title: scalar("title").unwrap_or_else(|| title_case(&stem.replace('-', " "))),
        description: scalar("description").unwrap_or_default(),
        date: scalar("date").unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
        tags: metadata.get("tags").cloned().unwrap_or(Value::Array(vec![])),
        category: scalar("category").unwrap_or_else(|| "General".to_string()),
        content,
    }
}

// "my-first-post" becomes "My First Post". Any non-alphabetic character
// starts a new word.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                titled.extend(c.to_uppercase());
            } else {
                titled.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            titled.push(c);
            at_word_start = true;
        }
    }

    titled
}

// Frontmatter allows tags as a list or as one comma-joined string; the index
// always stores a list.
fn index_tags(tags: &Value) -> Vec<String> {
    match tags {
        Value::Array(items) => items
            .iter()
            .map(|tag| match tag {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) if !s.is_empty() => s.split(", ").map(str::to_string).collect(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::generate_renderer;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_generate_writes_page_and_index() {
        let root = TempDir::new().unwrap();
        let markdown_dir = root.path().join("markdown");
        let posts_dir = root.path().join("posts");
        fs::create_dir_all(&markdown_dir).unwrap();
        fs::write(
            markdown_dir.join("first-post.md"),
            "---\ntitle: First Post\ndate: 2025-01-15\ntags: [\"x\", \"y\"]\n---\n# Hello\n\nBody text.",
        )
        .unwrap();

        let handlebars = generate_renderer().unwrap();
        generate(&markdown_dir, &posts_dir, &handlebars).unwrap();

        let page = fs::read_to_string(posts_dir.join("first-post.html")).unwrap();
        assert!(page.contains("<title>First Post • Jongmin Choi</title>"));
        assert!(page.contains("January 15, 2025 • x, y"));
        assert!(page.contains("<h1>Hello</h1>"));
        assert!(page.contains("<p>Body text.</p>"));

        let index: Value =
            serde_json::from_str(&fs::read_to_string(posts_dir.join("index.json")).unwrap())
                .unwrap();
        assert_eq!(index[0]["title"], "First Post");
        assert_eq!(index[0]["date"], "2025-01-15");
        assert_eq!(index[0]["tags"], json!(["x", "y"]));
        assert_eq!(index[0]["filename"], "first-post.html");
    }

    #[test]
    fn test_missing_markdown_dir_is_a_clean_noop() {
        let root = TempDir::new().unwrap();
        let posts_dir = root.path().join("posts");
        fs::create_dir_all(&posts_dir).unwrap();

        let handlebars = generate_renderer().unwrap();
        generate(&root.path().join("missing"), &posts_dir, &handlebars).unwrap();

        assert_eq!(fs::read_dir(&posts_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_non_markdown_files_are_ignored() {
        let root = TempDir::new().unwrap();
        let markdown_dir = root.path().join("markdown");
        let posts_dir = root.path().join("posts");
        fs::create_dir_all(&markdown_dir).unwrap();
        fs::write(markdown_dir.join("notes.txt"), "not a post").unwrap();

        let handlebars = generate_renderer().unwrap();
        generate(&markdown_dir, &posts_dir, &handlebars).unwrap();

        assert!(!posts_dir.join("notes.html").exists());
        let index = fs::read_to_string(posts_dir.join("index.json")).unwrap();
        assert_eq!(index.trim(), "[]");
    }

    #[test]
    fn test_defaults_applied_without_frontmatter() {
        let metadata = Map::new();
        let data = resolve_page_data(&metadata, "my-first-post", String::new());

        assert_eq!(data.title, "My First Post");
        assert_eq!(data.description, "");
        assert_eq!(data.tags, json!([]));
        assert_eq!(data.category, "General");
        assert_eq!(data.date, Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_title_case_restarts_after_digits() {
        assert_eq!(title_case("rustconf 2025 recap"), "Rustconf 2025 Recap");
    }

    #[test]
    fn test_index_tags_from_scalar() {
        assert_eq!(
            index_tags(&json!("rust, blog")),
            vec!["rust".to_string(), "blog".to_string()]
        );
        assert_eq!(index_tags(&json!("")), Vec::<String>::new());
        assert_eq!(index_tags(&json!(null)), Vec::<String>::new());
    }
}
