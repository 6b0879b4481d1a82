use super::Element;
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,
    #[error("Unexpected character '{0}' at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("Missing name after '{0}'")]
    MissingName(char),
    #[error("Unterminated attribute selector")]
    UnterminatedAttr,
    #[error("Unsupported selector syntax: {0}")]
    Unsupported(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

/// A single compound selector: `tag#id.class[attr][attr="value"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Selector {
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && element.tag() != *tag
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.id().as_deref() != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
            && self.attrs.iter().all(|a| match &a.value {
                Some(v) => element.attr(&a.name).as_deref() == Some(v.as_str()),
                None => element.has_attr(&a.name),
            })
    }
}

type Chars<'a> = Peekable<CharIndices<'a>>;

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_name(chars: &mut Chars<'_>) -> String {
    let mut name = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if !is_name_char(c) {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn expect_name(chars: &mut Chars<'_>, prefix: char) -> Result<String, SelectorError> {
    let name = read_name(chars);
    if name.is_empty() {
        return Err(SelectorError::MissingName(prefix));
    }
    Ok(name)
}

fn read_attr(chars: &mut Chars<'_>) -> Result<AttrMatch, SelectorError> {
    let name = expect_name(chars, '[')?;
    match chars.next() {
        Some((_, ']')) => Ok(AttrMatch { name, value: None }),
        Some((_, '=')) => {
            let quote = match chars.peek() {
                Some(&(_, q @ ('"' | '\''))) => {
                    chars.next();
                    Some(q)
                }
                _ => None,
            };
            let mut value = String::new();
            loop {
                match chars.next() {
                    None => return Err(SelectorError::UnterminatedAttr),
                    Some((_, c)) if Some(c) == quote => match chars.next() {
                        Some((_, ']')) => break,
                        Some((pos, c)) => return Err(SelectorError::UnexpectedChar(c, pos)),
                        None => return Err(SelectorError::UnterminatedAttr),
                    },
                    Some((_, ']')) if quote.is_none() => break,
                    Some((_, c)) => value.push(c),
                }
            }
            Ok(AttrMatch {
                name,
                value: Some(value),
            })
        }
        Some((pos, c)) => Err(SelectorError::UnexpectedChar(c, pos)),
        None => Err(SelectorError::UnterminatedAttr),
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selector = Selector::default();
        let mut chars = s.char_indices().peekable();

        match chars.peek() {
            Some(&(_, '*')) => {
                chars.next();
            }
            Some(&(_, c)) if is_name_char(c) => {
                selector.tag = Some(read_name(&mut chars).to_ascii_lowercase());
            }
            _ => {}
        }

        while let Some((pos, c)) = chars.next() {
            match c {
                '#' => selector.id = Some(expect_name(&mut chars, '#')?),
                '.' => selector.classes.push(expect_name(&mut chars, '.')?),
                '[' => selector.attrs.push(read_attr(&mut chars)?),
                ',' => return Err(SelectorError::Unsupported("selector lists")),
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                    return Err(SelectorError::Unsupported("combinators"));
                }
                _ => return Err(SelectorError::UnexpectedChar(c, pos)),
            }
        }

        Ok(selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compound() {
        let sel: Selector = "button.action-button[aria-label]".parse().unwrap();
        assert_eq!(sel.tag.as_deref(), Some("button"));
        assert_eq!(sel.classes, vec!["action-button".to_string()]);
        assert_eq!(sel.attrs.len(), 1);
        assert_eq!(sel.attrs[0].value, None);
    }

    #[test]
    fn test_parse_attr_values() {
        let cases = vec![
            (r#"[data-action="audio"]"#, "audio"),
            ("[data-action='walk']", "walk"),
            ("[data-action=vr]", "vr"),
            (r#"[aria-label="Close ]"]"#, "Close ]"),
        ];

        for (input, expected) in cases {
            let sel: Selector = input.parse().unwrap();
            assert_eq!(sel.attrs[0].value.as_deref(), Some(expected), "{input}");
        }
    }

    #[test]
    fn test_parse_errors() {
        let cases = vec![
            ("", SelectorError::Empty),
            ("   ", SelectorError::Empty),
            ("#", SelectorError::MissingName('#')),
            ("div.", SelectorError::MissingName('.')),
            ("[open", SelectorError::UnterminatedAttr),
            ("div span", SelectorError::Unsupported("combinators")),
            ("div,span", SelectorError::Unsupported("selector lists")),
            ("div!", SelectorError::UnexpectedChar('!', 3)),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<Selector>().unwrap_err(), expected, "{input}");
        }
    }

    #[test]
    fn test_tag_is_case_insensitive() {
        let sel: Selector = "BUTTON".parse().unwrap();
        assert!(sel.matches(&Element::create("button")));
    }

    #[test]
    fn test_matches() {
        let el = Element::create("div")
            .with_id("hud-timer")
            .with_class("game-timer")
            .with_attr("role", "status");

        for ok in ["div", "#hud-timer", ".game-timer", "div#hud-timer.game-timer", "[role]", "*"] {
            assert!(ok.parse::<Selector>().unwrap().matches(&el), "{ok}");
        }
        for miss in ["span", "#hud-points", ".modal", "[hidden]", r#"[role="dialog"]"#] {
            assert!(!miss.parse::<Selector>().unwrap().matches(&el), "{miss}");
        }
    }
}
