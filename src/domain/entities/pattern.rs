//! Command templates compiled into anchored matchers
//!
//! A template such as `add <x> <y>` is literal text with `<name>`
//! placeholders. Each placeholder captures either an unquoted run of text or a
//! double-quoted string (quotes stripped), so `add "1 2" 3` binds `x = "1 2"`.
//! The whole message must match; literal segments honour the case flag while
//! captured values keep their original case.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex_lite::{Regex, RegexBuilder};

use crate::application::errors::CommandError;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z_][A-Za-z0-9_]*)>").expect("placeholder regex is valid"));

/// Captured placeholder values keyed by placeholder name.
pub type Captures = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A compiled command template.
#[derive(Debug, Clone)]
pub struct Pattern {
    template: String,
    case_sensitive: bool,
    placeholders: Vec<String>,
    /// Full form first, then forms with optional trailing placeholders dropped.
    variants: Vec<Regex>,
}

impl Pattern {
    pub fn compile(template: &str, case_sensitive: bool) -> Result<Self, CommandError> {
        Self::compile_with_optional::<&str>(template, case_sensitive, &[])
    }

    /// Compile a template whose trailing placeholders named in `optional` may
    /// be left out of the message together with the literal that precedes them.
    pub fn compile_with_optional<S: AsRef<str>>(
        template: &str,
        case_sensitive: bool,
        optional: &[S],
    ) -> Result<Self, CommandError> {
        let segments = parse(template)?;
        let optional: HashSet<&str> = optional.iter().map(AsRef::as_ref).collect();

        let placeholders = segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Placeholder(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect();

        let mut variants = vec![build_regex(template, &segments, case_sensitive)?];
        let mut shortened = segments.clone();
        loop {
            let droppable = match shortened.as_slice() {
                [.., Segment::Literal(_), Segment::Placeholder(name)] => optional.contains(name.as_str()),
                _ => false,
            };
            if !droppable {
                break;
            }

            // Drop the placeholder and the whitespace separating it from the text before it.
            shortened.pop();
            if let Some(Segment::Literal(last)) = shortened.last_mut() {
                let trimmed = last.trim_end();
                if trimmed.is_empty() {
                    shortened.pop();
                } else {
                    *last = trimmed.to_string();
                }
            }
            if shortened.is_empty() {
                break;
            }
            variants.push(build_regex(template, &shortened, case_sensitive)?);
        }

        Ok(Self {
            template: template.to_string(),
            case_sensitive,
            placeholders,
            variants,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Match the whole of `text`, returning the captured placeholder values.
    pub fn matches(&self, text: &str) -> Option<Captures> {
        self.variants.iter().find_map(|regex| {
            let caps = regex.captures(text)?;
            Some(
                regex
                    .capture_names()
                    .flatten()
                    .filter_map(|name| caps.name(name).map(|m| (name.to_string(), m.as_str().to_string())))
                    .collect(),
            )
        })
    }
}

fn parse(template: &str) -> Result<Vec<Segment>, CommandError> {
    let invalid = |reason: String| CommandError::Pattern {
        template: template.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > cursor {
            segments.push(Segment::Literal(template[cursor..whole.start()].to_string()));
        } else if matches!(segments.last(), Some(Segment::Placeholder(_))) {
            return Err(invalid(format!("placeholder <{}> directly follows another placeholder", name.as_str())));
        }
        if !seen.insert(name.as_str()) {
            return Err(invalid(format!("placeholder <{}> used more than once", name.as_str())));
        }
        segments.push(Segment::Placeholder(name.as_str().to_string()));
        cursor = whole.end();
    }
    if cursor < template.len() {
        segments.push(Segment::Literal(template[cursor..].to_string()));
    }
    Ok(segments)
}

fn build_regex(template: &str, segments: &[Segment], case_sensitive: bool) -> Result<Regex, CommandError> {
    let mut source = String::from("^");
    for segment in segments {
        match segment {
            Segment::Literal(text) => source.push_str(&regex_lite::escape(text)),
            Segment::Placeholder(name) => source.push_str(&format!(r#""?(?P<{name}>[^"]*)"?"#)),
        }
    }
    source.push('$');

    RegexBuilder::new(&source)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| CommandError::Pattern {
            template: template.to_string(),
            reason: e.to_string(),
        })
}
