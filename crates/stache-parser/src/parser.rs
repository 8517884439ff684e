//! Template text to parse tree.
//!
//! The parser scans for the active opening delimiter and classifies the tag
//! that follows. Open sections are kept on an explicit stack, each expecting
//! its own name as the closer, so nesting depth costs heap rather than call
//! stack. At most [`MAX_SECTION_DEPTH`] sections may be open at once.
//! Delimiter changes are local to the region being parsed: a `{{=<% %>=}}`
//! inside a section body does not leak past `{{/section}}`.
//!
//! # Standalone tags
//!
//! A non-interpolating tag (`#`, `^`, `/`, `!`, `=`, `>`) alone on its line,
//! apart from spaces and tabs, swallows that whitespace together with the
//! line terminator (`\r\n`, `\n` or `\r`). The indentation of a standalone
//! partial is kept on the node so the renderer can indent the partial.

use tracing::trace;

use crate::delimiters::Delimiters;
use crate::error::{ParseError, Position};
use crate::node::{Node, ParseTree};

/// How many sections may be open at once.
pub const MAX_SECTION_DEPTH: usize = 128;

/// Parses `template` with the default `{{` / `}}` delimiters.
///
/// ```rust
/// use stache_parser::{parse, Node};
///
/// let tree = parse("Hi {{name}}!").unwrap();
/// assert_eq!(tree.nodes()[1], Node::Variable { name: "name".into(), escaped: true });
/// ```
pub fn parse(template: &str) -> Result<ParseTree, ParseError> {
    Parser::new().parse(template)
}

/// Parses `template` starting from the given delimiter pair.
pub fn parse_with(template: &str, delimiters: &Delimiters) -> Result<ParseTree, ParseError> {
    Parser::with_delimiters(delimiters.clone()).parse(template)
}

/// A reusable parser configured with its initial delimiters.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    delimiters: Delimiters,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        Self { delimiters }
    }

    /// The delimiters each parse starts with.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Parses a complete template.
    pub fn parse(&self, template: &str) -> Result<ParseTree, ParseError> {
        let scanner = Scanner { src: template };
        scanner.scan(self.delimiters.clone()).map(ParseTree::new)
    }
}

/// A section whose closing tag has not been reached yet.
struct OpenSection<'a> {
    name: &'a str,
    inverted: bool,
    /// Offset of the opening tag.
    at: usize,
    /// Where the body text starts.
    body_start: usize,
    /// Delimiters in force at the opening tag.
    delimiters: Delimiters,
    /// Nodes of the enclosing region parsed so far.
    outer: Vec<Node>,
}

#[derive(Debug)]
enum TagKind<'a> {
    Variable { name: &'a str, escaped: bool },
    Section(&'a str),
    Inverted(&'a str),
    Close(&'a str),
    Partial(&'a str),
    Comment,
    SetDelimiters(Delimiters),
}

impl TagKind<'_> {
    fn can_stand_alone(&self) -> bool {
        !matches!(self, TagKind::Variable { .. })
    }
}

#[derive(Debug)]
struct Tag<'a> {
    kind: TagKind<'a>,
    start: usize,
    end: usize,
}

struct Scanner<'a> {
    src: &'a str,
}

impl<'a> Scanner<'a> {
    fn position(&self, offset: usize) -> Position {
        Position::from_offset(self.src, offset)
    }

    fn scan(&self, mut delimiters: Delimiters) -> Result<Vec<Node>, ParseError> {
        let mut open: Vec<OpenSection<'a>> = Vec::new();
        let mut nodes = Vec::new();
        let mut cursor = 0;

        loop {
            let Some(found) = self.src[cursor..].find(delimiters.open()) else {
                if let Some(section) = open.last() {
                    return Err(ParseError::UnclosedSection {
                        name: section.name.to_string(),
                        position: self.position(section.at),
                    });
                }
                push_literal(&mut nodes, &self.src[cursor..]);
                return Ok(nodes);
            };

            let tag = self.tag(cursor + found, &delimiters)?;
            let standalone = if tag.kind.can_stand_alone() {
                self.standalone_line(cursor, tag.start, tag.end)
            } else {
                None
            };
            let (text_end, resume) = standalone.unwrap_or((tag.start, tag.end));
            let inverted = matches!(tag.kind, TagKind::Inverted(_));
            push_literal(&mut nodes, &self.src[cursor..text_end]);
            cursor = resume;

            match tag.kind {
                TagKind::Variable { name, escaped } => nodes.push(Node::Variable {
                    name: name.to_string(),
                    escaped,
                }),
                TagKind::Comment => nodes.push(Node::Comment),
                TagKind::SetDelimiters(next) => {
                    trace!(open = next.open(), close = next.close(), "delimiters changed");
                    delimiters = next;
                }
                TagKind::Partial(name) => {
                    let indent = match standalone {
                        Some((line_start, _)) => &self.src[line_start..tag.start],
                        None => "",
                    };
                    nodes.push(Node::Partial {
                        name: name.to_string(),
                        indent: indent.to_string(),
                    });
                }
                TagKind::Section(name) | TagKind::Inverted(name) => {
                    if open.len() >= MAX_SECTION_DEPTH {
                        return Err(ParseError::TooDeeplyNested {
                            name: name.to_string(),
                            limit: MAX_SECTION_DEPTH,
                            position: self.position(tag.start),
                        });
                    }
                    open.push(OpenSection {
                        name,
                        inverted,
                        at: tag.start,
                        body_start: resume,
                        delimiters: delimiters.clone(),
                        outer: std::mem::take(&mut nodes),
                    });
                }
                TagKind::Close(name) => {
                    let Some(section) = open.pop() else {
                        return Err(ParseError::UnopenedClose {
                            name: name.to_string(),
                            position: self.position(tag.start),
                        });
                    };
                    if section.name != name {
                        return Err(ParseError::MismatchedClose {
                            expected: section.name.to_string(),
                            found: name.to_string(),
                            position: self.position(tag.start),
                        });
                    }

                    let body = ParseTree::new(std::mem::replace(&mut nodes, section.outer));
                    nodes.push(if section.inverted {
                        Node::Inverted {
                            name: name.to_string(),
                            body,
                        }
                    } else {
                        Node::Section {
                            name: name.to_string(),
                            body,
                            raw: self.src[section.body_start..text_end].to_string(),
                            delimiters: section.delimiters.clone(),
                        }
                    });
                    delimiters = section.delimiters;
                }
            }
        }
    }

    /// Reads the tag whose opening delimiter starts at `start`.
    fn tag(&self, start: usize, delimiters: &Delimiters) -> Result<Tag<'a>, ParseError> {
        let open_end = start + delimiters.open().len();
        let after_open = &self.src[open_end..];
        let leading = after_open.len() - after_open.trim_start().len();
        let sigil_at = open_end + leading;
        let inner = &self.src[sigil_at..];

        if inner.starts_with(delimiters.close()) {
            return Err(ParseError::EmptyTag {
                position: self.position(start),
            });
        }

        let Some(sigil) = inner.chars().next() else {
            return Err(ParseError::UnclosedTag {
                position: self.position(start),
            });
        };
        let body_at = sigil_at + sigil.len_utf8();

        let (kind, end) = match sigil {
            '{' => {
                let closer = format!("}}{}", delimiters.close());
                let (content, end) = self.until(start, body_at, &closer)?;
                let name = self.name(start, content)?;
                (
                    TagKind::Variable {
                        name,
                        escaped: false,
                    },
                    end,
                )
            }
            '=' => {
                let closer = format!("={}", delimiters.close());
                let (content, end) = self.until(start, body_at, &closer)?;
                (TagKind::SetDelimiters(self.delimiter_change(start, content)?), end)
            }
            '!' => {
                let (_, end) = self.until(start, body_at, delimiters.close())?;
                (TagKind::Comment, end)
            }
            '&' | '#' | '^' | '/' | '>' => {
                let (content, end) = self.until(start, body_at, delimiters.close())?;
                let name = self.name(start, content)?;
                let kind = match sigil {
                    '&' => TagKind::Variable {
                        name,
                        escaped: false,
                    },
                    '#' => TagKind::Section(name),
                    '^' => TagKind::Inverted(name),
                    '/' => TagKind::Close(name),
                    _ => TagKind::Partial(name),
                };
                (kind, end)
            }
            c if is_unknown_sigil(c) => {
                return Err(ParseError::UnknownSigil {
                    sigil: c,
                    position: self.position(start),
                });
            }
            _ => {
                let (content, end) = self.until(start, sigil_at, delimiters.close())?;
                let name = self.name(start, content)?;
                (
                    TagKind::Variable {
                        name,
                        escaped: true,
                    },
                    end,
                )
            }
        };

        Ok(Tag { kind, start, end })
    }

    /// Finds `closer` at or after `from`, returning the text before it and
    /// the offset just past it.
    fn until(
        &self,
        tag_start: usize,
        from: usize,
        closer: &str,
    ) -> Result<(&'a str, usize), ParseError> {
        match self.src[from..].find(closer) {
            Some(i) => Ok((&self.src[from..from + i], from + i + closer.len())),
            None => Err(ParseError::UnclosedTag {
                position: self.position(tag_start),
            }),
        }
    }

    fn name(&self, tag_start: usize, content: &'a str) -> Result<&'a str, ParseError> {
        let name = content.trim();
        if name.is_empty() {
            return Err(ParseError::EmptyTag {
                position: self.position(tag_start),
            });
        }
        if is_valid_name(name) {
            Ok(name)
        } else {
            Err(ParseError::InvalidName {
                name: name.to_string(),
                position: self.position(tag_start),
            })
        }
    }

    fn delimiter_change(&self, tag_start: usize, content: &str) -> Result<Delimiters, ParseError> {
        let invalid = |reason: String| ParseError::InvalidDelimiters {
            tag: content.trim().to_string(),
            reason,
            position: self.position(tag_start),
        };

        let parts: Vec<&str> = content.split_whitespace().collect();
        match parts.as_slice() {
            [open, close] => Delimiters::new(*open, *close).map_err(|e| invalid(e.reason.into())),
            _ => Err(invalid(format!(
                "expected two delimiters, found {}",
                parts.len()
            ))),
        }
    }

    /// If the tag spanning `start..end` sits alone on its line, returns the
    /// offsets of the line start and of the position after its terminator.
    ///
    /// Leading whitespace is only searched back to `cursor`, the end of the
    /// previous tag; the character before the line start decides whether the
    /// tag begins a line.
    fn standalone_line(&self, cursor: usize, start: usize, end: usize) -> Option<(usize, usize)> {
        let before = &self.src[cursor..start];
        let indent = before.len() - before.trim_end_matches([' ', '\t']).len();
        let line_start = start - indent;
        if line_start > 0 && !matches!(self.src.as_bytes()[line_start - 1], b'\n' | b'\r') {
            return None;
        }

        let after = &self.src[end..];
        let trailing = after.len() - after.trim_start_matches([' ', '\t']).len();
        let rest = &after[trailing..];
        let terminator = if rest.is_empty() {
            0
        } else if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') || rest.starts_with('\r') {
            1
        } else {
            return None;
        };

        Some((line_start, end + trailing + terminator))
    }
}

fn push_literal(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Literal(previous)) = nodes.last_mut() {
        previous.push_str(text);
    } else {
        nodes.push(Node::Literal(text.to_string()));
    }
}

/// Punctuation that would start a tag type this engine does not implement
/// (`{{<parent}}`, `{{$block}}`, `{{%pragma}}` ...).
fn is_unknown_sigil(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '.' | '_' | '-')
}

fn is_valid_name(name: &str) -> bool {
    if name == "." {
        return true;
    }
    !name.chars().any(char::is_whitespace) && name.split('.').all(|part| !part.is_empty())
}
