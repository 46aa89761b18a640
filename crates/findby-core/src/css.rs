//! CSS selector to XPath location path translation.
//!
//! Supports the selector subset people actually put in front of `*=`:
//!
//! | CSS | XPath |
//! |-----|-------|
//! | `div`, `*` | `//div`, `//*` |
//! | `#main` | `//*[@id = "main"]` |
//! | `.btn` | `//*[contains(concat(" ", normalize-space(@class), " "), " btn ")]` |
//! | `[type]`, `[type=submit]` | `[@type]`, `[@type = "submit"]` |
//! | `[a~=v]` `[a\|=v]` `[a^=v]` `[a$=v]` `[a*=v]` | word, dash, prefix, suffix, substring tests |
//! | `a b`, `a > b` | `//a//b`, `//a/b` |
//! | `a + b`, `a ~ b` | `//a/following-sibling::*[1]/self::b`, `//a/following-sibling::b` |
//! | `a, b` | `(//a \| //b)` |
//! | `:first-child`, `:last-child`, `:only-child`, `:nth-child(N)` | sibling-count predicates |
//! | `:empty`, `:checked`, `:disabled`, `:enabled` | node and attribute predicates |

use crate::literal;

/// Why a CSS selector could not be translated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CssError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("selector ended unexpectedly")]
    UnexpectedEnd,
    #[error("unterminated attribute selector starting at offset {0}")]
    UnterminatedAttribute(usize),
    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),
    #[error("unsupported pseudo-class ':{0}'")]
    UnsupportedPseudo(String),
    #[error("combinator '{0}' is not followed by a selector")]
    DanglingCombinator(char),
}

/// Translate a CSS selector into an absolute XPath location path.
///
/// Selector groups (`a, b`) become a parenthesized union so the result can
/// still take a trailing predicate or `//` step.
pub fn to_xpath(selector: &str) -> Result<String, CssError> {
    let mut parser = Parser::new(selector);
    let mut groups = Vec::new();

    loop {
        groups.push(parser.parse_group()?);
        let offset = parser.pos;
        match parser.bump() {
            None => break,
            Some(',') => continue,
            Some(ch) => return Err(CssError::UnexpectedChar { ch, offset }),
        }
    }

    if groups.len() == 1 {
        Ok(groups.remove(0))
    } else {
        Ok(format!("({})", groups.join(" | ")))
    }
}

/// Relationship between a compound selector and the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
    Adjacent,
    Sibling,
}

impl Combinator {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::Adjacent),
            '~' => Some(Combinator::Sibling),
            _ => None,
        }
    }

    fn symbol(self) -> char {
        match self {
            Combinator::Descendant => ' ',
            Combinator::Child => '>',
            Combinator::Adjacent => '+',
            Combinator::Sibling => '~',
        }
    }

    /// The location step prefix placed before the element test.
    fn step(self) -> &'static str {
        match self {
            Combinator::Descendant => "//",
            Combinator::Child => "/",
            Combinator::Adjacent => "/following-sibling::*[1]/self::",
            Combinator::Sibling => "/following-sibling::",
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    /// Returns true if any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> CssError {
        match self.peek() {
            Some(ch) => CssError::UnexpectedChar {
                ch,
                offset: self.pos,
            },
            None => CssError::UnexpectedEnd,
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii())
        {
            self.bump();
        }
        if self.pos > start {
            Some(&self.input[start..self.pos])
        } else {
            None
        }
    }

    fn expect_ident(&mut self) -> Result<&'a str, CssError> {
        self.ident().ok_or_else(|| self.unexpected())
    }

    /// Parse one comma-separated group, stopping before `,` or end of input.
    fn parse_group(&mut self) -> Result<String, CssError> {
        self.skip_whitespace();
        if matches!(self.peek(), None | Some(',')) {
            return Err(CssError::Empty);
        }

        let mut xpath = String::new();
        self.parse_compound(Combinator::Descendant, &mut xpath)?;

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some(c) => match Combinator::from_char(c) {
                    Some(combinator) => {
                        self.bump();
                        self.skip_whitespace();
                        combinator
                    }
                    None if had_whitespace => Combinator::Descendant,
                    None => return Err(self.unexpected()),
                },
            };

            if matches!(self.peek(), None | Some(',')) {
                return Err(CssError::DanglingCombinator(combinator.symbol()));
            }
            self.parse_compound(combinator, &mut xpath)?;
        }

        Ok(xpath)
    }

    /// Parse a compound selector (`div#main.btn[type]:first-child`).
    fn parse_compound(&mut self, combinator: Combinator, out: &mut String) -> Result<(), CssError> {
        let start = self.pos;
        let tag = if self.eat('*') {
            "*"
        } else {
            self.ident().unwrap_or("*")
        };

        let mut predicates = String::new();
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    let id = self.expect_ident()?;
                    predicates.push_str(&format!("[@id = {}]", literal::encode(id)));
                }
                Some('.') => {
                    self.bump();
                    let class = self.expect_ident()?;
                    predicates.push_str(&word_test("class", class));
                }
                Some('[') => predicates.push_str(&self.parse_attribute()?),
                Some(':') => predicates.push_str(&self.parse_pseudo()?),
                _ => break,
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }

        out.push_str(combinator.step());
        out.push_str(tag);
        out.push_str(&predicates);
        Ok(())
    }

    fn parse_attribute(&mut self) -> Result<String, CssError> {
        let open = self.pos;
        self.bump();
        self.skip_whitespace();
        let name = self.expect_ident()?;
        self.skip_whitespace();

        if self.eat(']') {
            return Ok(format!("[@{}]", name));
        }

        let operator = match self.bump() {
            Some('=') => '=',
            Some(op @ ('~' | '|' | '^' | '$' | '*')) if self.eat('=') => op,
            Some(ch) => {
                return Err(CssError::UnexpectedChar {
                    ch,
                    offset: self.pos - ch.len_utf8(),
                });
            }
            None => return Err(CssError::UnterminatedAttribute(open)),
        };

        self.skip_whitespace();
        let value = self.parse_value()?;
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(CssError::UnterminatedAttribute(open));
        }

        let attr = format!("@{}", name);
        let predicate = match operator {
            '=' => format!("[{} = {}]", attr, literal::encode(&value)),
            '~' => word_test(name, &value),
            '|' => format!(
                "[{attr} = {} or starts-with({attr}, {})]",
                literal::encode(&value),
                literal::encode(&format!("{}-", value))
            ),
            '^' => format!("[starts-with({}, {})]", attr, literal::encode(&value)),
            '$' => format!(
                "[substring({attr}, string-length({attr}) - {} + 1) = {}]",
                value.chars().count(),
                literal::encode(&value)
            ),
            _ => format!("[contains({}, {})]", attr, literal::encode(&value)),
        };
        Ok(predicate)
    }

    /// Parse a quoted string or a bare identifier attribute value.
    fn parse_value(&mut self) -> Result<String, CssError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let open = self.pos;
                self.bump();
                let start = self.pos;
                while let Some(c) = self.bump() {
                    if c == quote {
                        return Ok(self.input[start..self.pos - 1].to_string());
                    }
                }
                Err(CssError::UnterminatedString(open))
            }
            _ => Ok(self.expect_ident()?.to_string()),
        }
    }

    fn parse_pseudo(&mut self) -> Result<String, CssError> {
        self.bump();
        let name = self
            .ident()
            .ok_or_else(|| CssError::UnsupportedPseudo(self.input[self.pos..].to_string()))?;

        let argument = if self.eat('(') {
            let start = self.pos;
            while self.peek().is_some_and(|c| c != ')') {
                self.bump();
            }
            if !self.eat(')') {
                return Err(CssError::UnexpectedEnd);
            }
            Some(self.input[start..self.pos - 1].trim())
        } else {
            None
        };

        let predicate = match (name, argument) {
            ("first-child", None) => "[not(preceding-sibling::*)]".to_string(),
            ("last-child", None) => "[not(following-sibling::*)]".to_string(),
            ("only-child", None) => {
                "[not(preceding-sibling::*) and not(following-sibling::*)]".to_string()
            }
            ("empty", None) => "[not(node())]".to_string(),
            ("checked", None) => "[@checked]".to_string(),
            ("disabled", None) => "[@disabled]".to_string(),
            ("enabled", None) => "[not(@disabled)]".to_string(),
            ("nth-child", Some(arg)) => match arg.parse::<usize>() {
                Ok(n) if n > 0 => format!("[count(preceding-sibling::*) = {}]", n - 1),
                _ => return Err(CssError::UnsupportedPseudo(format!("nth-child({})", arg))),
            },
            (name, Some(arg)) => {
                return Err(CssError::UnsupportedPseudo(format!("{}({})", name, arg)))
            }
            (name, None) => return Err(CssError::UnsupportedPseudo(name.to_string())),
        };
        Ok(predicate)
    }
}

/// Whitespace-separated word test, as used by `.class` and `[attr~=word]`.
fn word_test(attribute: &str, word: &str) -> String {
    format!(
        "[contains(concat(\" \", normalize-space(@{}), \" \"), {})]",
        attribute,
        literal::encode(&format!(" {} ", word))
    )
}
