//! Line-oriented parser turning a chat message into a [`ParsedIdea`]
//!
//! ```text
//! Title line
//! Optional description, any number of lines
//! * ungrouped section
//! # Group title
//! * grouped section
//!   continuing on the next line
//! ```
//!
//! Lengths are measured in bytes. The platform's own character counting is
//! inconsistent for emojis, so byte counts may reject input the platform would
//! accept but never accept input it would reject.
//!
//! All delimiters (`\n`, `*`, `#`, space) are ASCII, so byte positions found
//! while scanning are always valid char boundaries.

use std::fmt;

use idea_core::MAX_SECTIONS;

use super::humanize::ordinal;

/// Maximum length of the idea title and of group titles, in bytes
pub const MAX_TITLE_LEN: usize = 256;
/// Maximum length of a single section, in bytes
pub const MAX_SECTION_LEN: usize = 1024;

/// Structured content of an idea message, before symbols are assigned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedIdea {
    pub title: String,
    pub description: Option<String>,
    /// Sections before the first group
    pub sections: Vec<String>,
    pub groups: Vec<ParsedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGroup {
    pub title: String,
    pub sections: Vec<String>,
}

impl ParsedIdea {
    /// Total number of sections, ungrouped and grouped
    pub fn section_count(&self) -> usize {
        self.sections.len() + self.groups.iter().map(|g| g.sections.len()).sum::<usize>()
    }
}

/// Renders the idea back to message markup that parses to the same value
impl fmt::Display for ParsedIdea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)?;
        if let Some(description) = &self.description {
            write!(f, "\n{description}")?;
        }
        for section in &self.sections {
            write!(f, "\n* {section}")?;
        }
        for group in &self.groups {
            write!(f, "\n# {}", group.title)?;
            for section in &group.sections {
                write!(f, "\n* {section}")?;
            }
        }
        Ok(())
    }
}

/// Why a message could not be parsed
///
/// The `Display` output is meant to be shown to the author as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("An idea needs a title.")]
    EmptyTitle,

    #[error("The title may be no longer than 256 characters, yours is {overflow} too long.")]
    TitleTooLong { overflow: usize },

    #[error("An idea must have both a title and description or a title and at least one section.")]
    MissingBody,

    #[error("A group title may not be empty.")]
    EmptyGroupTitle,

    #[error("Group titles may be no longer than 256 characters, yours is {overflow} too long.")]
    GroupTitleTooLong { overflow: usize },

    #[error("A group needs at least one section.")]
    EmptyGroup,

    #[error(
        "I expected the line after the {} group to start with a section (`*`), but I found `{found}`.",
        ordinal(*.group)
    )]
    ExpectedSection {
        /// 1-based position of the group in the message
        group: usize,
        found: char,
    },

    #[error("A section may not be empty.")]
    EmptySection,

    #[error("Sections may be no longer than 1024 characters, yours is {overflow} too long.")]
    SectionTooLong { overflow: usize },

    #[error("An idea cannot have more than 15 sections.")]
    TooManySections,
}

/// Parse a message into an idea
pub fn parse(text: &str) -> Result<ParsedIdea, ParseError> {
    Parser::new(text).run()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Title,
    DescriptionOrSection,
    Description,
    SectionOrGroupTitle,
    GroupTitle,
    Section,
    Done,
}

struct Parser<'a> {
    raw: &'a str,
    pos: usize,
    sections: usize,
    idea: ParsedIdea,
}

impl<'a> Parser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            pos: 0,
            sections: 0,
            idea: ParsedIdea::default(),
        }
    }

    fn run(mut self) -> Result<ParsedIdea, ParseError> {
        let mut state = State::Title;
        loop {
            state = match state {
                State::Title => self.title()?,
                State::DescriptionOrSection => self.description_or_section()?,
                State::Description => self.description()?,
                State::SectionOrGroupTitle => self.section_or_group_title(),
                State::GroupTitle => self.group_title()?,
                State::Section => self.section()?,
                State::Done => break,
            };
        }

        if self.idea.description.is_none() && self.sections == 0 {
            return Err(ParseError::MissingBody);
        }
        Ok(self.idea)
    }

    // ---- scanning helpers ----

    fn peek(&self) -> Option<u8> {
        self.raw.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.raw.len()
    }

    fn skip_all(&mut self, byte: u8) {
        while self.peek() == Some(byte) {
            self.pos += 1;
        }
    }

    /// Consume the rest of the current line, excluding the newline
    fn take_line(&mut self) -> &'a str {
        let rest = &self.raw[self.pos..];
        let end = rest.find('\n').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    /// Consume up to the next line starting with `*` or `#`, excluding the
    /// newlines before it
    fn take_block(&mut self) -> &'a str {
        let bytes = self.raw.as_bytes();
        let start = self.pos;
        let end = (start..bytes.len())
            .find(|&i| bytes[i] == b'\n' && matches!(bytes.get(i + 1), Some(b'*' | b'#')))
            .unwrap_or(bytes.len());

        let block = self.raw[start..end].trim_end_matches('\n');
        self.pos = start + block.len();
        block
    }

    fn end_of_block(&self) -> State {
        if self.at_end() {
            State::Done
        } else {
            State::SectionOrGroupTitle
        }
    }

    // ---- states ----

    fn title(&mut self) -> Result<State, ParseError> {
        let title = self.take_line();
        if title.len() > MAX_TITLE_LEN {
            return Err(ParseError::TitleTooLong {
                overflow: title.len() - MAX_TITLE_LEN,
            });
        }
        if title.trim().is_empty() {
            return Err(ParseError::EmptyTitle);
        }

        self.idea.title = title.to_string();
        Ok(State::DescriptionOrSection)
    }

    fn description_or_section(&mut self) -> Result<State, ParseError> {
        self.skip_all(b'\n');

        match self.peek() {
            None => Err(ParseError::MissingBody),
            Some(b'#') => Ok(State::GroupTitle),
            Some(b'*') => Ok(State::Section),
            Some(_) => Ok(State::Description),
        }
    }

    fn description(&mut self) -> Result<State, ParseError> {
        let description = self.take_block();
        if !description.trim().is_empty() {
            self.idea.description = Some(description.to_string());
        }
        Ok(self.end_of_block())
    }

    /// Called when positioned on newlines followed by `*` or `#`
    fn section_or_group_title(&mut self) -> State {
        self.skip_all(b'\n');

        match self.peek() {
            None => State::Done,
            Some(b'#') => State::GroupTitle,
            Some(_) => State::Section,
        }
    }

    fn group_title(&mut self) -> Result<State, ParseError> {
        // the hash
        self.pos += 1;

        if matches!(self.peek(), None | Some(b'\n')) {
            return Err(ParseError::EmptyGroupTitle);
        }

        self.skip_all(b' ');
        let title = self.take_line();
        if title.len() > MAX_TITLE_LEN {
            return Err(ParseError::GroupTitleTooLong {
                overflow: title.len() - MAX_TITLE_LEN,
            });
        }
        if title.trim().is_empty() {
            return Err(ParseError::EmptyGroupTitle);
        }

        self.idea.groups.push(ParsedGroup {
            title: title.to_string(),
            sections: Vec::new(),
        });

        self.skip_all(b'\n');
        match self.peek() {
            None | Some(b'#') => Err(ParseError::EmptyGroup),
            Some(b'*') => Ok(State::Section),
            Some(_) => Err(ParseError::ExpectedSection {
                group: self.idea.groups.len(),
                found: self.raw[self.pos..].chars().next().unwrap_or_default(),
            }),
        }
    }

    fn section(&mut self) -> Result<State, ParseError> {
        // the asterisk
        self.pos += 1;

        if self.sections >= MAX_SECTIONS {
            return Err(ParseError::TooManySections);
        }
        if matches!(self.peek(), None | Some(b'\n')) {
            return Err(ParseError::EmptySection);
        }
        self.sections += 1;

        self.skip_all(b' ');
        let content = self.take_block();
        if content.len() > MAX_SECTION_LEN {
            return Err(ParseError::SectionTooLong {
                overflow: content.len() - MAX_SECTION_LEN,
            });
        }
        if content.trim().is_empty() {
            return Err(ParseError::EmptySection);
        }

        let content = content.to_string();
        match self.idea.groups.last_mut() {
            Some(group) => group.sections.push(content),
            None => self.idea.sections.push(content),
        }

        Ok(self.end_of_block())
    }
}
