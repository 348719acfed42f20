//! `match` and `search`: I-Regexp pattern tests over strings.
use std::collections::HashMap;
use std::sync::RwLock;

use regex::Regex;

use super::{FunctionContext, FunctionDefinition, FunctionType};
use crate::value::ExpressionValue;

const REGEX_CACHE_CAPACITY: usize = 64;

const PARAMETERS: [FunctionType; 2] = [FunctionType::Value, FunctionType::Value];

/// Compiled patterns keyed by their source text. Once full, new patterns are
/// compiled on every call instead of being cached.
#[derive(Default)]
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn get_or_compile(&self, pattern: &str, anchored: bool) -> Result<Regex, regex::Error> {
        if let Ok(cache) = self.cache.read() {
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let translated = translate_pattern(pattern);
        let regex = if anchored {
            Regex::new(&format!("^(?:{translated})$"))?
        } else {
            Regex::new(&translated)?
        };

        if let Ok(mut cache) = self.cache.write() {
            if cache.len() < REGEX_CACHE_CAPACITY {
                cache.insert(pattern.to_string(), regex.clone());
            }
        }
        Ok(regex)
    }
}

/// Rewrites I-Regexp syntax for the `regex` crate. Outside a character class
/// `.` matches any character except line terminators, and `^` and `$` are
/// ordinary characters rather than anchors.
fn translate_pattern(pattern: &str) -> String {
    let mut result = String::with_capacity(pattern.len());
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                result.push(c);
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            }
            '[' if !in_class => {
                in_class = true;
                result.push(c);
            }
            ']' if in_class => {
                in_class = false;
                result.push(c);
            }
            '.' if !in_class => result.push_str("[^\\n\\r]"),
            '^' | '$' if !in_class => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

fn pattern_matches<'a>(
    function: &str,
    cache: &RegexCache,
    anchored: bool,
    args: &[ExpressionValue<'a>],
) -> ExpressionValue<'a> {
    let (Some(input), Some(pattern)) = (
        args.first().and_then(ExpressionValue::as_str),
        args.get(1).and_then(ExpressionValue::as_str),
    ) else {
        return ExpressionValue::FALSE;
    };
    match cache.get_or_compile(pattern, anchored) {
        Ok(regex) => regex.is_match(input).into(),
        Err(e) => {
            log::warn!("{function}(): invalid pattern '{pattern}': {e}");
            ExpressionValue::FALSE
        }
    }
}

/// `match(input, pattern)`: whether the whole input matches the pattern.
#[derive(Default)]
pub struct MatchFunction {
    cache: RegexCache,
}

impl FunctionDefinition for MatchFunction {
    fn name(&self) -> &str {
        "match"
    }

    fn result_type(&self) -> FunctionType {
        FunctionType::Logical
    }

    fn parameters(&self) -> &[FunctionType] {
        &PARAMETERS
    }

    fn execute<'a>(
        &self,
        args: &[ExpressionValue<'a>],
        _ctx: &FunctionContext<'_>,
    ) -> ExpressionValue<'a> {
        pattern_matches(self.name(), &self.cache, true, args)
    }
}

/// `search(input, pattern)`: whether any substring of the input matches the pattern.
#[derive(Default)]
pub struct SearchFunction {
    cache: RegexCache,
}

impl FunctionDefinition for SearchFunction {
    fn name(&self) -> &str {
        "search"
    }

    fn result_type(&self) -> FunctionType {
        FunctionType::Logical
    }

    fn parameters(&self) -> &[FunctionType] {
        &PARAMETERS
    }

    fn execute<'a>(
        &self,
        args: &[ExpressionValue<'a>],
        _ctx: &FunctionContext<'_>,
    ) -> ExpressionValue<'a> {
        pattern_matches(self.name(), &self.cache, false, args)
    }
}
