//! umlforge-render-html: Render DomNode trees to HTML strings
//!
//! Produces SSR-ready HTML with data-key and data-a_ attributes so the
//! embedded studio.js script can take over once it loads.

use umlforge_dom::DomNode;

/// Void elements that must not have closing tags
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Render a DomNode tree to an HTML string.
pub fn render_to_html(node: &DomNode) -> String {
    let mut buf = String::with_capacity(4096);
    write_node(node, &mut buf);
    buf
}

/// Options for rendering a full HTML page.
pub struct PageOptions {
    pub root: DomNode,
    pub scripts: Vec<String>,
    pub inline_css: Option<String>,
    pub sse_url: Option<String>,
    pub mount_selector: Option<String>,
    pub title: Option<String>,
}

/// Render a full HTML page with SSR content, scripts, and styles.
pub fn render_page(opts: &PageOptions) -> String {
    let body_html = render_to_html(&opts.root);

    let mut html = String::with_capacity(body_html.len() + 2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");

    if let Some(title) = &opts.title {
        html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    }

    if let Some(css) = &opts.inline_css {
        html.push_str(&format!("<style>{}</style>\n", css));
    }

    html.push_str("</head>\n<body>\n");

    // Mount point with SSR content
    let mount = opts.mount_selector.as_deref().unwrap_or("#app");
    let id = mount.trim_start_matches('#');
    html.push_str(&format!("<div id=\"{}\">{}</div>\n", escape_attr(id), body_html));

    for src in &opts.scripts {
        html.push_str(&format!("<script src=\"{}\"></script>\n", escape_attr(src)));
    }

    if let Some(sse_url) = &opts.sse_url {
        html.push_str("<script>\n");
        html.push_str(&format!(
            "UmlForge.connect(\"{}\", \"{}\");\n",
            escape_js(sse_url),
            escape_js(mount)
        ));
        html.push_str("</script>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

fn write_node(node: &DomNode, buf: &mut String) {
    let is_void = VOID_ELEMENTS.contains(&node.tag.as_str());

    buf.push('<');
    buf.push_str(&node.tag);

    if let Some(key) = &node.key {
        buf.push_str(" data-key=\"");
        buf.push_str(&escape_attr(key));
        buf.push('"');
    }

    if let Some(attrs) = &node.attrs {
        // Sort for deterministic output
        let mut keys: Vec<&String> = attrs.keys().collect();
        keys.sort();
        for k in keys {
            buf.push(' ');
            buf.push_str(k);
            buf.push_str("=\"");
            buf.push_str(&escape_attr(&attrs[k]));
            buf.push('"');
        }
    }

    // Event attributes → data-a_ prefix
    if let Some(events) = &node.events {
        let mut keys: Vec<&String> = events.keys().collect();
        keys.sort();
        for k in keys {
            buf.push_str(" data-a_");
            buf.push_str(k);
            buf.push_str("=\"");
            buf.push_str(&escape_attr(&events[k]));
            buf.push('"');
        }
    }

    buf.push('>');

    if let Some(text) = &node.text {
        buf.push_str(&escape_html(text));
    }

    for child in node.children_iter() {
        write_node(child, buf);
    }

    if !is_void {
        buf.push_str("</");
        buf.push_str(&node.tag);
        buf.push('>');
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('<', "\\u003c")
}
