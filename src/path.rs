//! Dot-path tokenizer and evaluator over `serde_json::Value`.
//!
//! Syntax:
//! - `a.b` walks object keys
//! - `items.0` indexes arrays
//! - `items.#` is the array length, `items.#.name` projects `name` across
//!   every element
//! - `*` and `?` in a key glob-match object keys (first match wins)
//! - `\` escapes the next character

use serde_json::Value as Json;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Segment {
    /// Unescaped key text.
    pub(crate) key: String,
    /// Key text with escapes kept, used for glob matching.
    pattern: String,
    wildcard: bool,
}

impl Segment {
    fn is_count(&self) -> bool {
        self.pattern == "#"
    }
}

pub(crate) fn segments(path: &str) -> Vec<Segment> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut current = Segment {
        key: String::new(),
        pattern: String::new(),
        wildcard: false,
    };
    let mut chars = path.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(escaped) => {
                    current.key.push(escaped);
                    current.pattern.push('\\');
                    current.pattern.push(escaped);
                }
                None => {
                    current.key.push('\\');
                    current.pattern.push_str("\\\\");
                }
            },
            '.' => out.push(std::mem::replace(
                &mut current,
                Segment {
                    key: String::new(),
                    pattern: String::new(),
                    wildcard: false,
                },
            )),
            '*' | '?' => {
                current.wildcard = true;
                current.key.push(ch);
                current.pattern.push(ch);
            }
            _ => {
                current.key.push(ch);
                current.pattern.push(ch);
            }
        }
    }
    out.push(current);
    out
}

/// Resolves `path` against `root`. `None` means the path is missing.
pub(crate) fn lookup(root: &Json, path: &str) -> Option<Json> {
    let segments = segments(path);
    if segments.is_empty() {
        return None;
    }
    resolve(root, &segments)
}

fn resolve(value: &Json, segments: &[Segment]) -> Option<Json> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value.clone());
    };

    match value {
        Json::Array(items) => {
            if head.is_count() {
                if rest.is_empty() {
                    return Some(Json::from(items.len()));
                }
                let projected = items
                    .iter()
                    .filter_map(|item| resolve(item, rest))
                    .collect();
                return Some(Json::Array(projected));
            }
            if head.wildcard {
                return None;
            }
            let index = head.key.parse::<usize>().ok()?;
            resolve(items.get(index)?, rest)
        }
        Json::Object(map) => {
            if head.wildcard {
                let (_, child) = map
                    .iter()
                    .find(|(key, _)| glob_match(&head.pattern, key))?;
                return resolve(child, rest);
            }
            resolve(map.get(&head.key)?, rest)
        }
        _ => None,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
    Star,
    Any,
    Char(char),
}

fn tokens(pattern: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        out.push(match ch {
            '*' => Token::Star,
            '?' => Token::Any,
            '\\' => Token::Char(chars.next().unwrap_or('\\')),
            literal => Token::Char(literal),
        });
    }
    out
}

/// Glob match in `O(pattern * text)`: on a mismatch only the most recent
/// `*` is widened by one character.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern = tokens(pattern);
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut last_star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(Token::Star) => {
                last_star = Some((p, t));
                p += 1;
            }
            Some(Token::Any) => {
                p += 1;
                t += 1;
            }
            Some(Token::Char(ch)) if *ch == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match last_star {
                Some((star, consumed)) => {
                    last_star = Some((star, consumed + 1));
                    p = star + 1;
                    t = consumed + 1;
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|token| *token == Token::Star)
}
