use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::extractor_error::{ExtractorError, ExtractorResult};

/// Text content of the element with the given id, usually a
/// `<script id="...">` holding a JSON blob.
pub fn element_text_by_id(html: &str, id: &str) -> ExtractorResult<String> {
    let dom = tl::parse(html, tl::ParserOptions::default())
        .map_err(|e| ExtractorError::shape_mismatch(format!("unparsable HTML: {e:?}")))?;
    let parser = dom.parser();

    let text = dom
        .get_element_by_id(id)
        .and_then(|x| x.get(parser))
        .map(|x| x.inner_text(parser).trim().to_string())
        .filter(|x| !x.is_empty())
        .ok_or_else(|| {
            ExtractorError::shape_mismatch(format!("element with id `{id}` not found in page"))
        })?;

    Ok(text)
}

/// First capture group of `pattern` in `text`, trimmed.
///
/// `anchor` names what was searched for in the error message.
pub fn capture<'a>(pattern: &Regex, text: &'a str, anchor: &str) -> ExtractorResult<&'a str> {
    pattern
        .captures(text)
        .and_then(|x| x.get(1))
        .map(|x| x.as_str().trim())
        .filter(|x| !x.is_empty())
        .ok_or_else(|| ExtractorError::shape_mismatch(format!("`{anchor}` not found in page")))
}

static JS_UNDEFINED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<lead>[:\[,]\s*)undefined(?P<tail>\s*[,}\]])").expect("Invalid regex")
});

/// Make a JS object literal JSON-parsable by replacing bare `undefined` values.
#[must_use]
pub fn normalize_js_literals(js: &str) -> String {
    // Two passes so that adjacent values (`[undefined,undefined]`) both match
    let once = JS_UNDEFINED.replace_all(js, "${lead}null${tail}");
    JS_UNDEFINED
        .replace_all(&once, "${lead}null${tail}")
        .into_owned()
}

/// Thin wrapper over a parsed document for CSS selector lookups.
pub struct HtmlDocument(Html);

impl HtmlDocument {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self(Html::parse_document(html))
    }

    /// Value of `attr` on the first element matching `selector`.
    #[must_use]
    pub fn attr(&self, selector: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;

        self.0
            .select(&selector)
            .next()
            .and_then(|x| x.value().attr(attr))
            .map(|x| x.trim().to_string())
    }

    /// Concatenated, trimmed text of the first element matching `selector`.
    #[must_use]
    pub fn text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;

        self.0
            .select(&selector)
            .next()
            .map(|x| x.text().collect::<String>().trim().to_string())
    }
}
