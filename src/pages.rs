//! HTML for the landing and result pages

use crate::fetch::FetchOutcome;

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>URL Preview Service</title>
  <style>
    body { font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }
    input[type=text] { width: 36rem; }
  </style>
</head>
<body>
  <h1>URL Preview Service</h1>
  <p>Enter a URL and the server will fetch it for you.</p>
  <form method="post" action="/fetch">
    <input type="text" name="url" placeholder="https://example.com/" autofocus>
    <button type="submit">Fetch</button>
  </form>
</body>
</html>
"#;

pub fn index_page() -> &'static str {
    INDEX_HTML
}

/// Renders a relayed response. Both the URL and the body are escaped.
pub fn result_page(url: &str, outcome: &FetchOutcome) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Fetch result</title>
  <style>
    body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
    pre {{ background: #f4f4f4; padding: 1rem; white-space: pre-wrap; }}
  </style>
</head>
<body>
  <h1>Fetch result</h1>
  <p><strong>URL:</strong> <code>{url}</code></p>
  <p><strong>Status:</strong> <span class="status">{status}</span></p>
  <pre class="body">{body}</pre>
  <p><a href="/">Back</a></p>
</body>
</html>
"#,
        url = escape_html(url),
        status = outcome.status,
        body = escape_html(&outcome.body),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
