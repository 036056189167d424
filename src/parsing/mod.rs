//! Line-oriented DBC parser.
//!
//! [`SchemaParser`] consumes schema text one line at a time. Each line is
//! either skipped (blank), the `VERSION` line, a top-level record, or an
//! indented subrecord that is attached to the active record, i.e. the
//! top-level record added last. Anything else fails the parse.
//!
//! The active record is tracked by an index owned by the parser, so one
//! parser instance holds all state of one parse.
//!
//! # Example
//!
//! ```
//! use dbc_annotate::SchemaDocument;
//!
//! let doc = SchemaDocument::parse(
//!     "VERSION \"1.0\"\n\
//!      BO_ 1000 Speed: 6 ABC\n\
//!      \x20SG_ Wheel : 0|16@1+ (1,0) [0|0] \"MPH\" XYZ\n",
//! )?;
//! assert_eq!(doc.version, "1.0");
//! assert_eq!(doc.message(1000).map(|m| m.signal_count()), Some(1));
//! # Ok::<(), dbc_annotate::Error>(())
//! ```

mod grammar;

use alloc::string::String;

use crate::error::ParseError;
use crate::schema::{NamedList, Record, SchemaDocument, Subrecord};
use crate::Result;

/// How a normalized line was classified.
#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// `KEYWORD rest` or `KEYWORD: rest`
    TopLevel {
        keyword: &'a str,
        colon: bool,
        rest: Option<&'a str>,
    },
    /// Indented `KEYWORD [rest]`
    Sub { keyword: &'a str, rest: Option<&'a str> },
}

fn keyword_len(text: &str) -> usize {
    text.bytes()
        .take_while(|b| b.is_ascii_uppercase() || *b == b'_')
        .count()
}

fn non_empty(text: &str) -> Option<&str> {
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

/// Classify a line whose whitespace runs are already collapsed to one space.
fn classify(line: &str) -> Option<Line<'_>> {
    if let Some(indented) = line.strip_prefix(' ') {
        let len = keyword_len(indented);
        if len == 0 {
            return None;
        }
        return Some(match indented.split_once(' ') {
            Some((keyword, rest)) => Line::Sub {
                keyword,
                rest: non_empty(rest),
            },
            None => Line::Sub {
                keyword: indented,
                rest: None,
            },
        });
    }

    let len = keyword_len(line);
    if len == 0 {
        return None;
    }
    let (keyword, after) = line.split_at(len);
    if let Some(rest) = after.strip_prefix(':').or_else(|| after.strip_prefix(" :")) {
        return Some(Line::TopLevel {
            keyword,
            colon: true,
            rest: non_empty(rest),
        });
    }
    after.strip_prefix(' ').map(|rest| Line::TopLevel {
        keyword,
        colon: false,
        rest: non_empty(rest),
    })
}

fn collapse_whitespace(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_space = false;
    for c in line.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Builds a [`SchemaDocument`] from DBC text, one line at a time.
#[derive(Debug, Default)]
pub struct SchemaParser {
    document: SchemaDocument,
    /// Index of the record subrecord lines attach to
    active: Option<usize>,
    line_number: usize,
}

impl SchemaParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole sequence of lines.
    pub fn parse_lines<I, S>(lines: I) -> core::result::Result<SchemaDocument, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = Self::new();
        for line in lines {
            parser.feed_line(line.as_ref())?;
        }
        Ok(parser.finish())
    }

    /// Consume the next line of schema text.
    pub fn feed_line(&mut self, raw: &str) -> core::result::Result<(), ParseError> {
        self.line_number += 1;

        let line = raw.trim_end().trim_end_matches(';').trim_end();
        if line.is_empty() {
            return Ok(());
        }
        if let Some(version) = line.strip_prefix("VERSION ") {
            self.document.version = String::from(version.trim().trim_matches('"'));
            return Ok(());
        }

        let normalized = collapse_whitespace(line);
        match classify(&normalized) {
            Some(Line::TopLevel {
                keyword,
                colon,
                rest,
            }) => {
                let record = self.build_record(line, keyword, colon, rest)?;
                tracing::trace!(line = self.line_number, keyword, "adding record");
                self.active = Some(self.document.push_record(record));
                Ok(())
            }
            Some(Line::Sub { keyword, rest }) => {
                let subrecord = match (keyword, rest) {
                    ("SG_", Some(text)) => Subrecord::Signal(
                        grammar::signal(text)
                            .map_err(|reason| self.error(line, Some("SG_"), reason))?,
                    ),
                    (kind, Some(text)) => Subrecord::Attribute {
                        kind: String::from(kind),
                        text: String::from(text),
                    },
                    (kind, None) => Subrecord::Bare(String::from(kind)),
                };
                self.attach(line, subrecord)
            }
            None => Err(self.error(line, None, String::from("unparseable line"))),
        }
    }

    /// Finish the parse and hand out the document.
    pub fn finish(self) -> SchemaDocument {
        tracing::debug!(
            lines = self.line_number,
            records = self.document.records().len(),
            "schema parsed"
        );
        self.document
    }

    fn error(&self, line: &str, record: Option<&str>, reason: String) -> ParseError {
        ParseError::new(self.line_number, line, record, reason)
    }

    fn build_record(
        &self,
        line: &str,
        keyword: &str,
        colon: bool,
        rest: Option<&str>,
    ) -> core::result::Result<Record, ParseError> {
        if colon {
            return Ok(Record::List(NamedList {
                name: String::from(keyword),
                items: rest
                    .map(|r| r.split(' ').map(String::from).collect())
                    .unwrap_or_default(),
            }));
        }

        let text = rest.unwrap_or("");
        let record = match keyword {
            "BO_" => grammar::message(text).map(Record::Message),
            "BO_TX_BU_" => grammar::transmitter_list(text).map(Record::TransmitterList),
            "BA_DEF_" => grammar::attribute_definition(text).map(Record::AttributeDefinition),
            "BA_DEF_DEF_" => grammar::attribute_default(text).map(Record::AttributeDefault),
            "VAL_TABLE_" => grammar::value_table(text).map(Record::ValueTable),
            "VAL_" => grammar::value_assignment(text).map(Record::ValueAssignment),
            "BA_" => grammar::attribute_value(text).map(Record::AttributeValue),
            "CM_" => grammar::comment(text).map(Record::Comment),
            "SIG_GROUP_" => grammar::signal_group(text).map(Record::SignalGroup),
            _ => {
                return Err(self.error(
                    line,
                    None,
                    alloc::format!("unrecognized record keyword '{keyword}'"),
                ));
            }
        };
        record.map_err(|reason| self.error(line, Some(keyword), reason))
    }

    fn attach(&mut self, line: &str, subrecord: Subrecord) -> core::result::Result<(), ParseError> {
        let line_number = self.line_number;
        let Some(record) = self.active.and_then(|i| self.document.record_mut(i)) else {
            return Err(ParseError::new(
                line_number,
                line,
                None,
                String::from("subrecord before any top-level record"),
            ));
        };
        record.append(subrecord).map_err(|reason| {
            ParseError::new(line_number, line, Some(record.keyword()), String::from(reason))
        })
    }
}

impl SchemaDocument {
    /// Parse DBC text.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(SchemaParser::parse_lines(text.lines())?)
    }

    /// Parse DBC text supplied as separate lines.
    pub fn from_lines<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(SchemaParser::parse_lines(lines)?)
    }

    /// Parse DBC text from a buffered reader.
    ///
    /// Requires the `std` feature.
    #[cfg(feature = "std")]
    pub fn from_reader<R: std::io::BufRead>(reader: R) -> Result<Self> {
        let mut parser = SchemaParser::new();
        for line in reader.lines() {
            parser.feed_line(&line?)?;
        }
        Ok(parser.finish())
    }

    /// Parse a `.dbc` file from disk.
    ///
    /// Requires the `std` feature.
    #[cfg(feature = "std")]
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}
