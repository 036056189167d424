//! Positional grammars of the individual DBC record kinds.
//!
//! Each function takes the text after the record keyword (whitespace already
//! normalized, trailing `;` removed) and returns the record or a reason for
//! rejecting it. The parser adds the line number and keyword.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use crate::bits::ByteOrder;
use crate::schema::{
    AttributeDefault, AttributeDefinition, AttributeValue, Comment, CommentTarget, MessageDef,
    SignalDef, SignalGroup, TransmitterList, ValueAssignment, ValueDescription, ValueTable,
};

pub(crate) type GrammarResult<T> = core::result::Result<T, String>;

const OBJECT_TYPES: [&str; 4] = ["BU_", "BO_", "SG_", "EV_"];

/// Split on spaces, keeping double-quoted spans (quotes included) together.
pub(crate) fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut in_quotes = false;
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && !in_quotes => {
                if let Some(s) = start.take() {
                    tokens.push(&text[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

fn unquote(token: &str) -> String {
    token.trim_matches('"').to_string()
}

fn number<T: FromStr>(token: &str, what: &str) -> GrammarResult<T> {
    token
        .trim()
        .parse()
        .map_err(|_| format!("non-numeric {what} '{token}'"))
}

fn delimited<'a>(token: &'a str, open: char, close: char, what: &str) -> GrammarResult<&'a str> {
    token
        .strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .ok_or_else(|| format!("{what} must be enclosed in '{open}{close}', got '{token}'"))
}

/// `<id> <name>: <byte_len> <origin>`
pub(crate) fn message(text: &str) -> GrammarResult<MessageDef> {
    let (head, tail) = text
        .split_once(':')
        .ok_or_else(|| String::from("missing ':' after message name"))?;
    let head: Vec<&str> = head.split_whitespace().collect();
    let tail: Vec<&str> = tail.split_whitespace().collect();

    match (head.as_slice(), tail.as_slice()) {
        ([id, name], [byte_len, origin]) => Ok(MessageDef::new(
            number(id, "message id")?,
            name,
            number(byte_len, "byte length")?,
            origin,
        )),
        _ => Err(String::from("expected '<id> <name>: <byte_length> <origin>'")),
    }
}

/// `<name> : <start>|<len>@<order><sign> (<scale>,<offset>) [<min>|<max>] "<unit>" <destination>`
pub(crate) fn signal(text: &str) -> GrammarResult<SignalDef> {
    let (name, body) = text
        .split_once(':')
        .ok_or_else(|| String::from("missing ':' after signal name"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(String::from("missing signal name"));
    }

    let tokens = tokenize(body);
    let [layout, transform, range, unit, destination] = tokens.as_slice() else {
        return Err(format!(
            "expected 5 fields after the signal name, found {}",
            tokens.len()
        ));
    };

    let (start_bit, rest) = layout
        .split_once('|')
        .ok_or_else(|| format!("missing '|' in bit layout '{layout}'"))?;
    let (bit_length, order_sign) = rest
        .split_once('@')
        .ok_or_else(|| format!("missing '@' in bit layout '{layout}'"))?;

    let mut flags = order_sign.chars();
    let (byte_order, signed) = match (flags.next(), flags.next(), flags.next()) {
        (Some(digit), Some(sign), None) => {
            let order = ByteOrder::from_digit(digit)
                .ok_or_else(|| format!("unknown byte order '{digit}'"))?;
            let signed = match sign {
                '+' => false,
                '-' => true,
                other => return Err(format!("unknown sign '{other}'")),
            };
            (order, signed)
        }
        _ => return Err(format!("invalid byte order/sign '{order_sign}'")),
    };

    let start_bit: u16 = number(start_bit, "start bit")?;
    let bit_length: u16 = number(bit_length, "bit length")?;
    if !(1..=64).contains(&bit_length) {
        return Err(format!("bit length {bit_length} outside 1..=64"));
    }

    let (scale, offset) = delimited(transform, '(', ')', "scale/offset")?
        .split_once(',')
        .ok_or_else(|| format!("missing ',' in '{transform}'"))?;
    let (min, max) = delimited(range, '[', ']', "range")?
        .split_once('|')
        .ok_or_else(|| format!("missing '|' in '{range}'"))?;

    Ok(SignalDef {
        name: String::from(name),
        start_bit,
        bit_length,
        byte_order,
        signed,
        scale: number(scale, "scale")?,
        offset: number(offset, "offset")?,
        min: number(min, "minimum")?,
        max: number(max, "maximum")?,
        unit: unquote(unit),
        destination: unquote(destination),
        message_len: 0,
    })
}

/// `<id> : <node>,<node>...`
pub(crate) fn transmitter_list(text: &str) -> GrammarResult<TransmitterList> {
    let (id, nodes) = text
        .split_once(':')
        .ok_or_else(|| String::from("missing ':' after message id"))?;
    Ok(TransmitterList {
        message_id: number(id, "message id")?,
        transmitters: nodes
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect(),
    })
}

/// `[<object_type>] <name> <data_type> <values...>`
pub(crate) fn attribute_definition(text: &str) -> GrammarResult<AttributeDefinition> {
    let mut tokens = tokenize(text).into_iter().peekable();
    let object_type = tokens
        .next_if(|t| OBJECT_TYPES.contains(t))
        .map(String::from);
    let (Some(name), Some(data_type)) = (tokens.next(), tokens.next()) else {
        return Err(String::from("expected '<name> <data_type> <values...>'"));
    };

    let rest: Vec<&str> = tokens.collect();
    let values = if rest.iter().any(|t| t.contains(',')) {
        rest.iter()
            .flat_map(|t| t.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(unquote)
            .collect()
    } else {
        rest.into_iter().map(unquote).collect()
    };

    Ok(AttributeDefinition {
        object_type,
        name: unquote(name),
        data_type: String::from(data_type),
        values,
    })
}

/// `<name> <default_value>`
pub(crate) fn attribute_default(text: &str) -> GrammarResult<AttributeDefault> {
    match tokenize(text).as_slice() {
        [name, value] => Ok(AttributeDefault {
            name: unquote(name),
            value: unquote(value),
        }),
        _ => Err(String::from("expected '<name> <default_value>'")),
    }
}

fn value_rows(tokens: &[&str]) -> GrammarResult<Vec<ValueDescription>> {
    if tokens.len() % 2 != 0 {
        return Err(format!(
            "unpaired value description '{}'",
            tokens.last().copied().unwrap_or_default()
        ));
    }
    tokens
        .chunks(2)
        .map(|pair| -> GrammarResult<ValueDescription> {
            Ok(ValueDescription {
                index: number(pair[0], "value index")?,
                label: unquote(pair[1]),
            })
        })
        .collect()
}

/// `<name> (<index> <label>)*`
pub(crate) fn value_table(text: &str) -> GrammarResult<ValueTable> {
    let tokens = tokenize(text);
    let Some((name, rows)) = tokens.split_first() else {
        return Err(String::from("missing value table name"));
    };
    Ok(ValueTable {
        name: String::from(*name),
        rows: value_rows(rows)?,
        attached: Vec::new(),
    })
}

/// `<message_id> <signal> (<index> <label>)*`
pub(crate) fn value_assignment(text: &str) -> GrammarResult<ValueAssignment> {
    let tokens = tokenize(text);
    if tokens.len() < 2 {
        return Err(String::from("expected '<message_id> <signal> (<index> <label>)*'"));
    }
    Ok(ValueAssignment {
        name: format!("{} {}", tokens[0], tokens[1]),
        rows: value_rows(&tokens[2..])?,
        attached: Vec::new(),
    })
}

/// `<name...> "<value>,<value>..."`
pub(crate) fn attribute_value(text: &str) -> GrammarResult<AttributeValue> {
    let tokens = tokenize(text);
    let Some((last, name)) = tokens.split_last().filter(|(_, name)| !name.is_empty()) else {
        return Err(String::from("expected '<name> <values>'"));
    };
    Ok(AttributeValue {
        name: name.join(" "),
        values: last
            .trim_matches('"')
            .split(',')
            .map(|v| String::from(v.trim()))
            .collect(),
        attached: Vec::new(),
    })
}

/// `[BU_ <node> | BO_ <id> | SG_ <id> <signal> | EV_ <name>] "<text>"`
pub(crate) fn comment(text: &str) -> GrammarResult<Comment> {
    let tokens = tokenize(text);
    let target = match tokens.as_slice() {
        [text] if text.starts_with('"') => (CommentTarget::Global, *text),
        ["BO_", id, text] => (CommentTarget::Message(number(id, "message id")?), *text),
        ["SG_", id, signal, text] => (
            CommentTarget::Signal(number(id, "message id")?, String::from(*signal)),
            *text,
        ),
        ["BU_", node, text] => (CommentTarget::Node(String::from(*node)), *text),
        ["EV_", name, text] => (CommentTarget::EnvironmentVariable(String::from(*name)), *text),
        _ => return Err(String::from("expected '<object_type> <id> \"<text>\"'")),
    };
    Ok(Comment {
        target: target.0,
        text: unquote(target.1),
    })
}

/// `<message_id> <group_name> : <signal> <signal>...`
pub(crate) fn signal_group(text: &str) -> GrammarResult<SignalGroup> {
    let (head, members) = text
        .split_once(':')
        .ok_or_else(|| String::from("missing ':' before group members"))?;
    let (id, name) = head
        .trim()
        .split_once(' ')
        .ok_or_else(|| String::from("expected '<message_id> <group_name> : <signals>'"))?;
    Ok(SignalGroup {
        message_id: number(id, "message id")?,
        name: String::from(name.trim()),
        members: members.split_whitespace().map(String::from).collect(),
    })
}
