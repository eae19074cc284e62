//! Indirect object scanning
//!
//! Walks the raw source line by line and records every `<id> <gen> obj`
//! header together with the span up to its closing `endobj` line. This is
//! not a tokenizer: a line that happens to look like an object header inside
//! a stream will be picked up as one.

use std::collections::BTreeMap;
use std::fmt;
use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    /// Object header at the start of a line: optional whitespace, id, generation, `obj`
    static ref RE_OBJ_HEADER: Regex = Regex::new(r"(?-u)^\s*(\d+)\s+(\d+)\s+obj").unwrap();
}

/// How object headers are paired with their `endobj` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    /// The closer must appear before the next object header. An object
    /// without one is kept and ends just before the next header.
    #[default]
    Bounded,
    /// First `endobj` line at or after the header, wherever it is. An object
    /// whose closer is missing steals the next object's `endobj`, and a
    /// header with no later `endobj` at all is dropped.
    Compatible,
}

/// A single line of the source, terminator excluded from `content`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Byte offset of the first byte of the line
    pub start: usize,
    /// Byte offset just past the line terminator
    pub end: usize,
    /// Line text without its terminator
    pub content: &'a [u8],
}

impl Line<'_> {
    /// Whether the line, ignoring surrounding whitespace, is exactly `keyword`
    pub fn is_keyword(&self, keyword: &[u8]) -> bool {
        self.content.trim_ascii() == keyword
    }
}

/// Split a buffer into lines, treating `\n`, `\r\n` and a lone `\r` as terminators
pub fn split_lines(source: &[u8]) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < source.len() {
        let terminator_len = match source[i] {
            b'\n' => 1,
            b'\r' if source.get(i + 1) == Some(&b'\n') => 2,
            b'\r' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        lines.push(Line {
            start,
            end: i + terminator_len,
            content: &source[start..i],
        });
        i += terminator_len;
        start = i;
    }

    if start < source.len() {
        lines.push(Line {
            start,
            end: source.len(),
            content: &source[start..],
        });
    }

    lines
}

/// Reference to an indirect object, written as `<id> <gen> R`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub id: u32,
    pub generation: u16,
}

impl ObjectRef {
    pub fn new(id: u32, generation: u16) -> Self {
        Self { id, generation }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.id, self.generation)
    }
}

/// An indirect object found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndirectObject {
    /// Object number
    pub id: u32,
    /// Generation number
    pub generation: u16,
    /// Offset of the first digit of the object number
    pub byte_offset: usize,
    /// Header line through the closing `endobj` line, inclusive
    pub raw_text: Vec<u8>,
}

impl IndirectObject {
    pub fn reference(&self) -> ObjectRef {
        ObjectRef::new(self.id, self.generation)
    }

    /// Whitespace-separated tokens of the raw object text
    pub fn tokens(&self) -> impl Iterator<Item = &[u8]> {
        self.raw_text
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty())
    }

    /// Value of the first `/Type` entry, taken as the token that follows it
    pub fn object_type(&self) -> Option<&[u8]> {
        let mut tokens = self.tokens();
        tokens.by_ref().find(|token| *token == b"/Type")?;
        tokens.next()
    }

    /// Whether the raw text contains `needle` anywhere
    pub fn contains(&self, needle: &[u8]) -> bool {
        find_subslice(&self.raw_text, needle, 0).is_some()
    }
}

/// Position of `needle` in `haystack`, searching from `from`
pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|pos| pos + from)
}

struct Header {
    line: usize,
    id: u32,
    generation: u16,
    byte_offset: usize,
}

fn parse_header(idx: usize, line: &Line<'_>) -> Option<Header> {
    let caps = RE_OBJ_HEADER.captures(line.content)?;
    let id_match = caps.get(1)?;
    let id = std::str::from_utf8(id_match.as_bytes()).ok()?.parse::<u32>().ok();
    let generation = std::str::from_utf8(caps.get(2)?.as_bytes()).ok()?.parse::<u16>().ok();

    match (id, generation) {
        (Some(id), Some(generation)) => Some(Header {
            line: idx,
            id,
            generation,
            byte_offset: line.start + id_match.start(),
        }),
        _ => {
            log::debug!("Ignoring object header with out-of-range numbers at offset {}", line.start);
            None
        }
    }
}

/// Scan `source` for indirect objects, in the order their headers appear
///
/// Malformed input yields fewer objects, never an error.
pub fn scan_objects(source: &[u8], mode: ScanMode) -> Vec<IndirectObject> {
    let lines = split_lines(source);

    let headers: Vec<Header> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| parse_header(idx, line))
        .collect();

    let mut objects = Vec::with_capacity(headers.len());

    for (k, header) in headers.iter().enumerate() {
        let is_closer = |line: &Line<'_>| line.is_keyword(b"endobj");

        let last_line = match mode {
            ScanMode::Compatible => {
                match lines[header.line..].iter().position(is_closer) {
                    Some(pos) => header.line + pos,
                    None => {
                        log::warn!(
                            "Object {} {} at offset {} has no endobj, skipping",
                            header.id, header.generation, header.byte_offset
                        );
                        continue;
                    }
                }
            }
            ScanMode::Bounded => {
                let limit = headers.get(k + 1).map_or(lines.len(), |next| next.line);
                match lines[header.line..limit].iter().position(is_closer) {
                    Some(pos) => header.line + pos,
                    None => {
                        log::warn!(
                            "Object {} {} at offset {} is not terminated before the next object",
                            header.id, header.generation, header.byte_offset
                        );
                        limit - 1
                    }
                }
            }
        };

        let span = lines[header.line].start..lines[last_line].end;
        log::debug!(
            "Found object {} {} at offset {} ({} bytes)",
            header.id, header.generation, header.byte_offset, span.len()
        );

        objects.push(IndirectObject {
            id: header.id,
            generation: header.generation,
            byte_offset: header.byte_offset,
            raw_text: source[span].to_vec(),
        });
    }

    objects
}

/// Objects keyed by object number
///
/// When an ID occurs more than once, the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable<'a> {
    objects: BTreeMap<u32, &'a IndirectObject>,
}

impl<'a> ObjectTable<'a> {
    pub fn new(objects: &'a [IndirectObject]) -> Self {
        let mut table = BTreeMap::new();
        for obj in objects {
            if table.insert(obj.id, obj).is_some() {
                log::warn!("Duplicate object ID {}, keeping the later definition", obj.id);
            }
        }
        Self { objects: table }
    }

    /// Number of distinct object IDs
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn max_id(&self) -> Option<u32> {
        self.objects.keys().next_back().copied()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn get(&self, id: u32) -> Option<&'a IndirectObject> {
        self.objects.get(&id).copied()
    }

    /// Objects in ascending ID order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &'a IndirectObject)> + '_ {
        self.objects.iter().map(|(id, obj)| (*id, *obj))
    }
}
