use anyhow::Context as _;
use chrono::NaiveDate;
use handlebars::{handlebars_helper, Handlebars};
use log::warn;
use serde_json::Value;

// The whole site chrome is this one fixed layout. The sidebar, header and
// footer are static; the profile placeholders are filled in client-side by
// render.js. Every placeholder is triple-stache because the pipeline never
// escapes HTML.
const POST_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{{title}}} • Jongmin Choi</title>
    <meta name="description" content="{{{description}}}" />
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&family=JetBrains+Mono:wght@400;600&display=swap" rel="stylesheet">
    <link rel="stylesheet" href="../assets/css/styles.css" />
  </head>
  <body class="has-rail">
    <aside class="profile-rail-global">
      <div class="profile-card">
        <img class="profile-photo" id="profile-photo-global" alt="profile photo" />
        <div class="profile-name" id="profile-name-global">Jongmin Choi</div>
        <div class="profile-affil" id="profile-affil-global"></div>

        <div class="profile-divider"></div>

        <div class="profile-section">
          <div class="profile-section-title">At a Glance</div>
          <div class="profile-stats" id="profile-stats-global"></div>
        </div>

        <div class="profile-divider"></div>

        <div class="profile-section">
          <div class="profile-section-title">Links</div>
          <div class="profile-links" id="profile-links-global"></div>
        </div>
      </div>
    </aside>

    <header class="site-header">
      <div class="container">
        <a href="../index.html" class="brand">Jongmin Choi</a>
        <nav class="site-nav">
          <a href="../index.html">About Me</a>
          <a href="../publications.html">Publications</a>
          <a href="../awards.html">Awards</a>
          <a href="../blog.html">Blog</a>
          <a href="../contact.html">Contact</a>
        </nav>
        <div class="header-actions">
          <button id="theme-toggle" class="theme-toggle" aria-label="Toggle theme">
            <span class="icon moon">☾</span>
            <span class="icon sun">☀</span>
          </button>
        </div>
      </div>
    </header>

    <main class="container">
      <article class="blog-post-content reveal">
        <h1>{{{title}}}</h1>
        <div class="post-meta" style="margin-bottom: 32px;">{{{long_date date}}} • {{{tag_list tags}}}</div>

        {{{content}}}
      </article>
    </main>

    <footer class="site-footer">
      <div class="container">
        <p>&copy; 2025 Jongmin Choi. All rights reserved.</p>
      </div>
    </footer>

    <script src="../assets/js/render.js"></script>
    <script src="../assets/js/main.js"></script>
  </body>
</html>"#;

handlebars_helper!(long_date: |date: str| format_long_date(date));

handlebars_helper!(tag_list: |tags: Json| match tags {
    Value::Array(items) => items
        .iter()
        .map(|tag| match tag {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", "),
    Value::String(s) => s.clone(),
    Value::Null => String::new(),
    other => other.to_string(),
});

pub(crate) fn generate_renderer() -> anyhow::Result<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_helper("long_date", Box::new(long_date));
    handlebars.register_helper("tag_list", Box::new(tag_list));
    handlebars
        .register_template_string("post", POST_TEMPLATE)
        .context("post template")?;

    Ok(handlebars)
}

fn format_long_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%B %d, %Y").to_string(),
        Err(_) => {
            warn!("date {date:?} is not YYYY-MM-DD, leaving it unformatted");
            date.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_contains_formatted_meta_line() {
        let handlebars = generate_renderer().unwrap();
        let page = handlebars
            .render(
                "post",
                &json!({
                    "title": "A Post",
                    "description": "about things",
                    "date": "2025-01-15",
                    "tags": ["x", "y"],
                    "category": "General",
                    "content": "<p>hi</p>",
                }),
            )
            .unwrap();

        assert!(page.contains("<title>A Post • Jongmin Choi</title>"));
        assert!(page.contains("<meta name=\"description\" content=\"about things\" />"));
        assert!(page.contains("January 15, 2025 • x, y"));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        assert_eq!(format_long_date("sometime soon"), "sometime soon");
        assert_eq!(format_long_date("2025-13-99"), "2025-13-99");
    }

    #[test]
    fn test_scalar_tags_are_coerced() {
        let handlebars = generate_renderer().unwrap();
        let page = handlebars
            .render(
                "post",
                &json!({
                    "title": "t",
                    "description": "",
                    "date": "not a date",
                    "tags": "rust, blog",
                    "category": "General",
                    "content": "",
                }),
            )
            .unwrap();

        assert!(page.contains("not a date • rust, blog"));
    }

    #[test]
    fn test_null_tags_render_empty() {
        let handlebars = generate_renderer().unwrap();
        let page = handlebars
            .render(
                "post",
                &json!({
                    "title": "t",
                    "description": "",
                    "date": "2024-02-05",
                    "tags": null,
                    "category": "General",
                    "content": "",
                }),
            )
            .unwrap();

        assert!(page.contains("February 05, 2024 • </div>"));
    }

    #[test]
    fn test_title_is_not_escaped() {
        let handlebars = generate_renderer().unwrap();
        let page = handlebars
            .render(
                "post",
                &json!({
                    "title": "Q&A",
                    "description": "",
                    "date": "2024-02-05",
                    "tags": [],
                    "category": "General",
                    "content": "",
                }),
            )
            .unwrap();

        assert!(page.contains("<h1>Q&A</h1>"));
    }
}
