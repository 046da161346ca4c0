//! Markup query capability and its `scraper`-backed implementation.
//!
//! The extractor only sees [`MarkupDocument`] / [`MarkupNode`]; any backend
//! able to answer selector queries can stand in for [`HtmlDocument`].

use scraper::{ElementRef, Html, Selector};
use vilabot_shared::VilabotError;

/// A selector could not be evaluated against the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },
}

impl From<ParseError> for VilabotError {
    fn from(err: ParseError) -> Self {
        VilabotError::parse(err.to_string())
    }
}

/// A parsed document that can be queried for nodes.
///
/// Queries are compiled once with [`MarkupDocument::compile`] and reused
/// across every node they are evaluated against.
pub trait MarkupDocument {
    /// Backend-specific compiled query.
    type Query;

    type Node<'a>: MarkupNode<Query = Self::Query>
    where
        Self: 'a;

    /// Compile `query` for this backend.
    fn compile(query: &str) -> Result<Self::Query, ParseError>;

    /// All nodes matching `query`, in document order.
    fn select(&self, query: &Self::Query) -> Vec<Self::Node<'_>>;
}

/// One element inside a [`MarkupDocument`].
pub trait MarkupNode: Sized {
    type Query;

    /// First descendant matching `query`, if any.
    fn select_first(&self, query: &Self::Query) -> Option<Self>;

    /// Text content with whitespace runs collapsed to single spaces.
    fn text(&self) -> String;

    /// Raw attribute value.
    fn attribute(&self, name: &str) -> Option<String>;
}

/// Compile a CSS selector, mapping the error into [`ParseError`].
pub fn compile_selector(query: &str) -> Result<Selector, ParseError> {
    Selector::parse(query).map_err(|e| ParseError::InvalidSelector {
        selector: query.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// scraper backend
// ---------------------------------------------------------------------------

/// HTML document parsed with `scraper` (html5ever), tolerant of broken markup.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }
}

impl MarkupDocument for HtmlDocument {
    type Query = Selector;
    type Node<'a> = HtmlNode<'a>;

    fn compile(query: &str) -> Result<Selector, ParseError> {
        compile_selector(query)
    }

    fn select(&self, query: &Selector) -> Vec<HtmlNode<'_>> {
        self.html.select(query).map(HtmlNode).collect()
    }
}

/// Element handle borrowed from an [`HtmlDocument`].
#[derive(Debug, Clone, Copy)]
pub struct HtmlNode<'a>(ElementRef<'a>);

impl MarkupNode for HtmlNode<'_> {
    type Query = Selector;

    fn select_first(&self, query: &Selector) -> Option<Self> {
        self.0.select(query).next().map(HtmlNode)
    }

    fn text(&self) -> String {
        self.0
            .text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.value().attr(name).map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select<'a>(doc: &'a HtmlDocument, query: &str) -> Vec<HtmlNode<'a>> {
        doc.select(&HtmlDocument::compile(query).unwrap())
    }

    #[test]
    fn select_preserves_document_order() {
        let doc = HtmlDocument::parse(
            r#"<ul><li class="e">one</li><li class="e">two</li><li class="e">three</li></ul>"#,
        );
        let nodes = select(&doc, ".e");
        assert_eq!(nodes.len(), 3, "{nodes:?}");
        let texts: Vec<String> = nodes.iter().map(|n| n.text()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn text_collapses_runs() {
        let doc = HtmlDocument::parse("<div class=\"t\">\n  Festa <b>Major</b>\n  de Gràcia </div>");
        let node = select(&doc, ".t").remove(0);
        assert_eq!(node.text(), "Festa Major de Gràcia");
    }

    #[test]
    fn select_first_searches_descendants_only() {
        let doc = HtmlDocument::parse(r#"<a class="card" href="/outer"><span>x</span></a>"#);
        let card = select(&doc, ".card").remove(0);
        let anchor = HtmlDocument::compile("a").unwrap();
        assert!(card.select_first(&anchor).is_none());
        assert_eq!(card.attribute("href").as_deref(), Some("/outer"));
    }

    #[test]
    fn compiled_query_is_reusable_across_nodes() {
        let doc = HtmlDocument::parse(
            r#"<div class="c"><b>u</b></div><div class="c"><b>dos</b></div>"#,
        );
        let bold = HtmlDocument::compile("b").unwrap();
        let texts: Vec<String> = select(&doc, ".c")
            .iter()
            .filter_map(|c| c.select_first(&bold))
            .map(|b| b.text())
            .collect();
        assert_eq!(texts, vec!["u", "dos"]);
    }

    #[test]
    fn invalid_selector_is_reported() {
        let err = HtmlDocument::compile("div[").unwrap_err();
        assert!(matches!(err, ParseError::InvalidSelector { ref selector, .. } if selector == "div["));
    }

    #[test]
    fn parse_error_converts_into_crate_error() {
        let err: VilabotError = HtmlDocument::compile("div[").unwrap_err().into();
        assert!(matches!(err, VilabotError::Parse { .. }));
        assert!(err.to_string().contains("div["));
    }
}
