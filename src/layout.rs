//! Selector configuration describing where data lives in a newsletter's markup.
//!
//! A [`Layout`] maps each logical field (issue heading, date, category
//! section, item title, ...) to a [`NodeSelector`]: a tag name plus an
//! optional attribute filter. Supporting another newsletter means writing a
//! different layout, usually as a YAML block in the config file:
//!
//! ```yaml
//! layout:
//!   date: { tag: time, attr: { name: class, equals: published } }
//!   category: { tag: section, attr: { name: class, pattern: "(category cc)." } }
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Element;
use serde::Deserialize;

static CATEGORY_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(category cc).").unwrap());

/// Everything that is not a letter, digit, `.,!?` or whitespace.
static DEFAULT_CLEAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9.,!?\s]+").unwrap());

/// A compiled regular expression that deserializes from a plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Pattern)
    }

    pub fn regex(&self) -> &Regex {
        &self.0
    }
}

impl TryFrom<String> for Pattern {
    type Error = regex::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Pattern::new(&value)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern(regex)
    }
}

/// How an attribute value is compared.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrMatch {
    /// Exact value. For `class` this matches any single class in the list.
    Equals(String),
    /// Unanchored regex search over the whole attribute value.
    Pattern(Pattern),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttrFilter {
    pub name: String,
    #[serde(flatten)]
    pub matcher: AttrMatch,
}

impl AttrFilter {
    fn matches(&self, element: &Element) -> bool {
        let Some(value) = element.attr(&self.name) else {
            return false;
        };
        match &self.matcher {
            AttrMatch::Equals(expected) if self.name.eq_ignore_ascii_case("class") => {
                value.split_whitespace().any(|class| class == expected)
            }
            AttrMatch::Equals(expected) => value == expected,
            AttrMatch::Pattern(pattern) => pattern.regex().is_match(value),
        }
    }
}

/// A (tag, attribute filter) pair identifying a class of document nodes.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSelector {
    pub tag: String,
    #[serde(default)]
    pub attr: Option<AttrFilter>,
}

impl NodeSelector {
    /// Match on tag name alone.
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attr: None,
        }
    }

    /// Match `tag` elements carrying `class` among their classes.
    pub fn with_class(tag: &str, class: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attr: Some(AttrFilter {
                name: "class".to_string(),
                matcher: AttrMatch::Equals(class.to_string()),
            }),
        }
    }

    /// Match `tag` elements whose `attr` value contains a match for `pattern`.
    pub fn with_pattern(tag: &str, attr: &str, pattern: impl Into<Pattern>) -> Self {
        Self {
            tag: tag.to_string(),
            attr: Some(AttrFilter {
                name: attr.to_string(),
                matcher: AttrMatch::Pattern(pattern.into()),
            }),
        }
    }

    pub fn matches(&self, element: &Element) -> bool {
        element.name().eq_ignore_ascii_case(&self.tag)
            && self.attr.as_ref().is_none_or(|filter| filter.matches(element))
    }
}

/// Selectors for one newsletter's archive and issue pages.
///
/// Defaults target the Data Elixir markup. `issue_heading` and `date` may be
/// set to `null` in YAML, in which case the matching metadata is left empty.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub issue_heading: Option<NodeSelector>,
    pub date: Option<NodeSelector>,
    pub category: NodeSelector,
    pub category_title: NodeSelector,
    pub item_title: NodeSelector,
    pub item_summary: NodeSelector,
    /// Heading on the archive front page whose text ends in the newest issue number.
    pub latest_issue: NodeSelector,
    /// Characters matched by this pattern are removed from extracted text.
    pub clean_pattern: Pattern,
    /// Trim surrounding whitespace after cleaning.
    pub trim_text: bool,
    /// Join relative item links onto the issue URL instead of keeping the
    /// `href` as written.
    pub resolve_links: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            issue_heading: Some(NodeSelector::tag("h1")),
            date: Some(NodeSelector::with_class("time", "published")),
            category: NodeSelector::with_pattern("section", "class", CATEGORY_CLASS.clone()),
            category_title: NodeSelector::with_class("span", "category__title__text"),
            item_title: NodeSelector::with_class("h3", "item__title"),
            item_summary: NodeSelector::with_class("span", "item__summary"),
            latest_issue: NodeSelector::with_class("h2", "item__heading"),
            clean_pattern: DEFAULT_CLEAN.clone().into(),
            trim_text: false,
            resolve_links: false,
        }
    }
}
