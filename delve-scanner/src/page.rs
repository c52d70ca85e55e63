use scraper::{Html, Node, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[href], [src]").expect("valid link selector"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid script selector"));

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "template", "noscript"];

/// The parts of a fetched page that passive mining looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    /// Rendered text, one text node per line.
    pub visible_text: String,
    /// `href` then `src` for every element carrying either attribute.
    pub link_attributes: Vec<Option<String>>,
    /// Bodies of inline `<script>` elements.
    pub script_bodies: Vec<String>,
}

impl PageSnapshot {
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut text_nodes = Vec::new();
        for node in document.tree.root().descendants() {
            let Node::Text(text) = node.value() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            let trimmed = text.trim();
            if !hidden && !trimmed.is_empty() {
                text_nodes.push(trimmed);
            }
        }

        let mut link_attributes = Vec::new();
        for element in document.select(&LINK_SELECTOR) {
            link_attributes.push(element.value().attr("href").map(String::from));
            link_attributes.push(element.value().attr("src").map(String::from));
        }

        let script_bodies = document
            .select(&SCRIPT_SELECTOR)
            .map(|script| script.text().collect::<String>())
            .filter(|body| !body.trim().is_empty())
            .collect();

        Self {
            visible_text: text_nodes.join("\n"),
            link_attributes,
            script_bodies,
        }
    }

    /// Non-HTML bodies (JSON, plain text) are mined as-is.
    pub fn from_text(content: &str) -> Self {
        Self {
            visible_text: content.to_string(),
            ..Default::default()
        }
    }
}
