use regex::{Regex, RegexBuilder};

/// Converts a restricted markdown dialect into an HTML fragment.
///
/// The rules run in a fixed order and each one rewrites the output of the
/// previous one. Nothing is HTML-escaped at any point: raw HTML written in a
/// post body is expected to survive conversion untouched.
pub(crate) fn to_html(markdown: &str) -> String {
    let html = headers(markdown);
    let html = emphasis(&html);
    let html = links(&html);
    let html = code(&html);
    let html = list_items(&html);
    let html = wrap_lists(&html);
    let html = paragraphs(&html);
    line_breaks(&html)
}

fn headers(text: &str) -> String {
    // longest prefix first, so "###" is not consumed by the "#" rule
    let h3 = Regex::new(r"(?m)^### (.*)$").unwrap();
    let h2 = Regex::new(r"(?m)^## (.*)$").unwrap();
    let h1 = Regex::new(r"(?m)^# (.*)$").unwrap();

    let html = h3.replace_all(text, "<h3>$1</h3>").into_owned();
    let html = h2.replace_all(&html, "<h2>$1</h2>").into_owned();
    h1.replace_all(&html, "<h1>$1</h1>").into_owned()
}

fn emphasis(text: &str) -> String {
    // bold runs first, otherwise the italic rule eats the double asterisks
    let bold = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    let italic = Regex::new(r"\*(.*?)\*").unwrap();

    let html = bold.replace_all(text, "<strong>$1</strong>").into_owned();
    italic.replace_all(&html, "<em>$1</em>").into_owned()
}

fn links(text: &str) -> String {
    let link = Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap();
    link.replace_all(text, "<a href=\"$2\" target=\"_blank\" rel=\"noopener\">$1</a>")
        .into_owned()
}

fn code(text: &str) -> String {
    let fence = RegexBuilder::new(r"```(\w+)?\n(.*?)\n```")
        .dot_matches_new_line(true)
        .build()
        .unwrap();
    let inline = Regex::new(r"`([^`]+)`").unwrap();

    let html = fence
        .replace_all(text, "<pre><code class=\"language-$1\">$2</code></pre>")
        .into_owned();
    inline.replace_all(&html, "<code>$1</code>").into_owned()
}

fn list_items(text: &str) -> String {
    // the ordinal of a numbered item is dropped, both marker styles come out
    // as plain <li> lines
    let bullet = Regex::new(r"(?m)^- (.*)$").unwrap();
    let numbered = Regex::new(r"(?m)^(\d+)\. (.*)$").unwrap();

    let html = bullet.replace_all(text, "<li>$1</li>").into_owned();
    numbered.replace_all(&html, "<li>$2</li>").into_owned()
}

fn wrap_lists(text: &str) -> String {
    // one <ul> per consecutive run of <li> lines; runs separated by other
    // content stay separate blocks
    let run = Regex::new(r"(?:<li>.*</li>\n?)+").unwrap();
    run.replace_all(text, |caps: &regex::Captures| {
        let matched = &caps[0];
        let items = matched.trim_end_matches('\n');
        let trailing = if matched.ends_with('\n') { "\n" } else { "" };
        format!("<ul>\n{items}\n</ul>{trailing}")
    })
    .into_owned()
}

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(|candidate| {
            let candidate = candidate.trim();
            if !candidate.is_empty() && !candidate.starts_with('<') {
                format!("<p>{candidate}</p>")
            } else {
                candidate.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn line_breaks(text: &str) -> String {
    // every remaining newline gets a <br>, except inside <pre> blocks and
    // between the lines of a <ul> block, which keep their raw newlines
    let mut html = String::with_capacity(text.len() + text.len() / 8);
    let mut open_pre = 0usize;
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('\n') {
        let line_end = pos + offset;
        let line = &text[pos..line_end];
        open_pre += line.matches("<pre>").count();
        open_pre = open_pre.saturating_sub(line.matches("</pre>").count());
        html.push_str(line);

        let rest = &text[line_end + 1..];
        if open_pre == 0 && !rest.starts_with("<li>") && !rest.starts_with("</ul>") {
            html.push_str("<br>\n");
        } else {
            html.push('\n');
        }
        pos = line_end + 1;
    }
    html.push_str(&text[pos..]);

    html
}
