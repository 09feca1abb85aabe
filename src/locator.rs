//! Locator strategies and ordered fallback chains

use anyhow::{Context, Result};
use regex::RegexBuilder;
use std::fmt;

/// How a candidate finds its element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorKind {
    /// Technical CSS selector, usually a `data-test-id`
    Css,
    /// `[name='value']` style attribute selector; the candidate value is the attribute value
    Attribute { name: String },
    /// Case-insensitive regex matched against an attribute (or the element
    /// text when `attribute` is `None`) of every element matching `scope`
    Pattern {
        scope: String,
        attribute: Option<String>,
    },
}

/// One strategy in a fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorCandidate {
    pub kind: LocatorKind,
    pub value: String,
}

impl LocatorCandidate {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Css,
            value: selector.into(),
        }
    }

    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Attribute { name: name.into() },
            value: value.into(),
        }
    }

    /// Match the `placeholder` attribute of any element that has one
    pub fn placeholder(pattern: impl Into<String>) -> Self {
        Self::pattern("[placeholder]", Some("placeholder"), pattern)
    }

    /// Match the `aria-label` attribute of any element that has one
    pub fn aria_label(pattern: impl Into<String>) -> Self {
        Self::pattern("[aria-label]", Some("aria-label"), pattern)
    }

    /// Match the visible text of elements under `scope`
    pub fn text(scope: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::pattern(scope, None, pattern)
    }

    pub fn pattern(
        scope: impl Into<String>,
        attribute: Option<&str>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            kind: LocatorKind::Pattern {
                scope: scope.into(),
                attribute: attribute.map(str::to_string),
            },
            value: pattern.into(),
        }
    }

    /// CSS query the backend runs to collect elements for this candidate
    pub fn css_query(&self) -> String {
        match &self.kind {
            LocatorKind::Css => self.value.clone(),
            LocatorKind::Attribute { name } => {
                format!("[{}='{}']", name, self.value.replace('\'', "\\'"))
            }
            LocatorKind::Pattern { scope, .. } => scope.clone(),
        }
    }

    /// Whether elements collected by [`css_query`](Self::css_query) need a second pass
    pub fn needs_match(&self) -> bool {
        matches!(self.kind, LocatorKind::Pattern { .. })
    }

    /// Attribute inspected by a pattern candidate, `None` for element text
    pub fn match_attribute(&self) -> Option<&str> {
        match &self.kind {
            LocatorKind::Pattern { attribute, .. } => attribute.as_deref(),
            _ => None,
        }
    }

    /// Test a collected attribute value or text against the pattern.
    ///
    /// Non-pattern candidates accept everything.
    pub fn matches(&self, haystack: &str) -> Result<bool> {
        if !self.needs_match() {
            return Ok(true);
        }
        let regex = RegexBuilder::new(&self.value)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid locator pattern: {}", self.value))?;
        Ok(regex.is_match(haystack))
    }
}

impl fmt::Display for LocatorCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LocatorKind::Css => write!(f, "css \"{}\"", self.value),
            LocatorKind::Attribute { name } => write!(f, "{}='{}'", name, self.value),
            LocatorKind::Pattern {
                scope,
                attribute: Some(attr),
            } => write!(f, "{} /{}/ in {}", attr, self.value, scope),
            LocatorKind::Pattern {
                scope,
                attribute: None,
            } => write!(f, "text /{}/ in {}", self.value, scope),
        }
    }
}

/// A logical element and its candidates, most stable first
#[derive(Debug, Clone)]
pub struct LocatorChain {
    name: String,
    candidates: Vec<LocatorCandidate>,
}

impl LocatorChain {
    /// A chain starts with its highest-priority candidate, so it is never empty
    pub fn new(name: impl Into<String>, first: LocatorCandidate) -> Self {
        Self {
            name: name.into(),
            candidates: vec![first],
        }
    }

    /// Append a lower-priority candidate
    pub fn then(mut self, candidate: LocatorCandidate) -> Self {
        self.candidates.push(candidate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[LocatorCandidate] {
        &self.candidates
    }

    pub fn describe(&self) -> String {
        self.candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
