use scraper::{Html, Node};

/// Elements whose text is never rendered as page content.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of an HTML document, text nodes concatenated in document order.
///
/// Whitespace is kept as-is; callers normalize before matching.
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut out = String::new();

    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else { continue };

        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(el) => HIDDEN.contains(&el.name()),
            _ => false,
        });
        if !hidden {
            out.push_str(text);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::normalize;

    #[test]
    fn test_extract_drops_scripts_and_styles() {
        let html = r##"
            <html><head>
              <style>.sold { content: "已售完"; }</style>
              <script>var s = "6880站區 已售完";</script>
            </head><body>
              <noscript>請啟用 JavaScript</noscript>
              <ul class="area-list">
                <li>6880站區 <font color="#AAAAAA">熱賣中</font></li>
                <li>6280站區 <span>已售完</span></li>
              </ul>
            </body></html>
        "##;
        let text = normalize(&extract_text(html));
        assert_eq!(text, "6880站區熱賣中6280站區已售完");
    }

    #[test]
    fn test_extract_keeps_adjacent_inline_text_joined() {
        let text = extract_text("<p>5880<b>看台區</b></p>");
        assert_eq!(text, "5880看台區");
    }

    #[test]
    fn test_extract_decodes_entities() {
        let text = extract_text("<p>Sold&nbsp;Out &amp; more</p>");
        assert_eq!(normalize(&text), "SoldOut&more");
    }

    #[test]
    fn test_extract_empty_document() {
        assert_eq!(normalize(&extract_text("")), "");
    }
}
