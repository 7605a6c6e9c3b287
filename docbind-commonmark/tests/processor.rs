use docbind_commonmark::{
  MarkdownOptions,
  MarkdownProcessor,
  Transforms,
  parse_document,
};

#[test]
fn test_escaped_code_block_survives_rendering() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let transforms = Transforms::new();

  let md = "# Usage\n\n```jsx\nexport default function Page() {\n  return <h1>Hi</h1>\n}\n```\n";
  let html = processor.render(&transforms.prepare_body(md));

  assert!(html.contains("&lt;h1&gt;Hi&lt;/h1&gt;"));
  assert!(!html.contains("<h1>Hi</h1>"));
  assert!(!html.contains("&amp;lt;"));
  assert!(html.contains(r#"<pre><code class="language-jsx">"#));
}

#[test]
fn test_annotated_block_renders_header_and_code() {
  let processor = MarkdownProcessor::default();
  let transforms = Transforms::new();

  let raw = "---\ntitle: Pages\n---\n```tsx filename=\"app/page.tsx\" switcher\nconst x = <div />\n```\n";
  let pre = transforms.preprocess(raw);
  let (metadata, body) = parse_document(&pre);
  assert!(metadata.is_valid());

  let html = processor.render(&transforms.prepare_body(body));
  assert!(
    html.contains(r#"<div class="code-header"><i>app/page.tsx (tsx)</i></div>"#)
  );
  assert!(html.contains("const x = &lt;div /&gt;"));
}

#[test]
fn test_code_block_in_list_item_stays_in_list() {
  let processor = MarkdownProcessor::default();
  let transforms = Transforms::new();

  let md = "1. Install:\n\n   ```bash\n   npm i * foo *\n   echo <done>\n   ```\n\n2. Next\n";
  let html = processor.render(&transforms.prepare_body(md));

  assert_eq!(html.matches("<ol").count(), 1);
  assert!(!html.contains("start=\"2\""));
  assert!(html.contains("npm i * foo *\necho &lt;done&gt;\n</code></pre>"));

  let code_end = html.find("</code></pre>").unwrap_or(usize::MAX);
  let first_item_end = html.find("</li>").unwrap_or(0);
  assert!(code_end < first_item_end);
}

#[test]
fn test_annotated_block_in_list_item() {
  let processor = MarkdownProcessor::default();
  let transforms = Transforms::new();

  let md = "1. Create the page:\n\n   ```tsx filename=\"app/page.tsx\"\n   export default () => <main />\n   ```\n\n2. Run it\n";
  let html =
    processor.render(&transforms.prepare_body(&transforms.preprocess(md)));

  assert_eq!(html.matches("<ol").count(), 1);
  assert!(
    html.contains(r#"<div class="code-header"><i>app/page.tsx (tsx)</i></div>"#)
  );
  assert!(html.contains("export default () =&gt; &lt;main /&gt;"));
}

#[test]
fn test_crlf_annotated_block_gets_header() {
  let processor = MarkdownProcessor::default();
  let transforms = Transforms::new();

  let md = "```js filename=\"a.js\"\r\nconst a = 1\r\n```\r\n";
  let html =
    processor.render(&transforms.prepare_body(&transforms.preprocess(md)));

  assert!(html.contains(r#"<div class="code-header"><i>a.js (js)</i></div>"#));
  assert!(html.contains(r#"<pre><code class="language-js">const a = 1"#));
}

#[test]
fn test_tables_and_footnotes() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let html = processor
    .render("| Option | Type |\n|---|---|\n| `a` | string |\n\nNote[^1]\n\n[^1]: Footnote.\n");
  assert!(html.contains("<table>"));
  assert!(html.contains("footnote"));
}

#[test]
fn test_plain_commonmark_has_no_tables() {
  let processor = MarkdownProcessor::new(MarkdownOptions::commonmark());
  let html = processor.render("| a |\n|---|\n| b |\n");
  assert!(!html.contains("<table>"));
}

#[test]
fn test_malformed_markdown_recovery() {
  let processor = MarkdownProcessor::default();
  let html = processor.render("# Unclosed [link\n\n```unclosed code block\n\nEnd.\n");
  assert!(!html.is_empty());
}
