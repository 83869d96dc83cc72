//! Index loader
//!
//! Parses generated search tables into [`IndexShard`]s. Two syntaxes are
//! accepted: the JavaScript form emitted by the documentation generator
//!
//! ```text
//! var searchData=
//! [
//!   ['abs_28float_29',['abs(float)',['http://.../fabs.html',1,'std']]],
//! ];
//! ```
//!
//! and plain JSON with the same nesting. Both are lowered to a
//! `serde_json::Value` tree before the record shape is checked.

use crate::error::IndexError;
use crate::index::types::{IndexShard, RawEntry, Target};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use serde_json::{Number, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Raw text of one shard together with the id it will be loaded under
#[derive(Debug, Clone)]
pub struct ShardSource {
    pub shard_id: String,
    pub text: String,
}

impl ShardSource {
    pub fn new(shard_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            shard_id: shard_id.into(),
            text: text.into(),
        }
    }
}

/// Parse a shard source into an [`IndexShard`]
pub fn load(source: &ShardSource) -> Result<IndexShard, IndexError> {
    let start = Instant::now();
    let shard_id = source.shard_id.as_str();

    let tree = if looks_like_json(&source.text) {
        serde_json::from_str::<Value>(&source.text)
            .map_err(|e| IndexError::malformed(shard_id, 0, format!("invalid JSON: {}", e)))?
    } else {
        ScriptParser::new(shard_id, &source.text).parse()?
    };

    let records = match tree {
        Value::Array(records) => records,
        _ => return Err(IndexError::malformed(shard_id, 0, "index is not an array")),
    };

    let entries = records
        .iter()
        .enumerate()
        .map(|(record, value)| parse_record(shard_id, record, value))
        .collect::<Result<Vec<_>, _>>()?;

    let shard = IndexShard::new(shard_id, entries)?;
    debug!(
        shard = shard_id,
        entries = shard.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "loaded shard"
    );
    Ok(shard)
}

/// Read and parse one shard file; the shard id is the file stem
pub fn load_file(path: &Path) -> Result<IndexShard, IndexError> {
    let text = fs::read_to_string(path).map_err(|source| IndexError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load(&ShardSource::new(shard_id_for_path(path), text))
}

/// Load many shard files in parallel.
///
/// Shards are returned in the order of `paths`. When several files fail, the
/// error of the first failing path is returned.
pub fn load_all(paths: &[PathBuf]) -> Result<Vec<IndexShard>, IndexError> {
    let results: Vec<Result<IndexShard, IndexError>> =
        paths.par_iter().map(|p| load_file(p)).collect();
    results.into_iter().collect()
}

/// Shard id for a file: its stem, e.g. `all_1` for `search/all_1.js`
pub fn shard_id_for_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("shard")
        .to_string()
}

/// List the shard files of a directory whose names match any of `patterns`,
/// sorted by file name
pub fn discover_shards(dir: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, IndexError> {
    let matcher = build_globset(patterns);
    let io_err = |source: std::io::Error| IndexError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .map(|name| matcher.is_match(name))
            .unwrap_or(false);
        if matches {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}

/// Expand a list of files and directories into shard files.
///
/// Directories are replaced by their matching shard files; files are kept
/// as given, in order.
pub fn resolve_paths(inputs: &[PathBuf], patterns: &[String]) -> Result<Vec<PathBuf>, IndexError> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            out.extend(discover_shards(input, patterns)?);
        } else {
            out.push(input.clone());
        }
    }
    Ok(out)
}

fn build_globset(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // Invalid patterns are skipped rather than matching everything
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with('[') && !trimmed.contains('\'') && !trimmed.trim_end().ends_with(';')
}

/// Check one record against `[key, [label, [url, flag, scope], ...]]`
fn parse_record(shard: &str, record: usize, value: &Value) -> Result<RawEntry, IndexError> {
    let malformed = |reason: &str| IndexError::malformed(shard, record, reason);

    let parts = value
        .as_array()
        .ok_or_else(|| malformed("record is not an array"))?;
    let key = parts
        .first()
        .ok_or_else(|| malformed("missing key"))?
        .as_str()
        .ok_or_else(|| malformed("key is not a string"))?;
    let payload = parts
        .get(1)
        .ok_or_else(|| malformed("missing label"))?
        .as_array()
        .ok_or_else(|| malformed("label block is not an array"))?;
    if parts.len() > 2 {
        return Err(malformed("record has more than two elements"));
    }

    let label = payload
        .first()
        .ok_or_else(|| malformed("missing label"))?
        .as_str()
        .ok_or_else(|| malformed("label is not a string"))?;
    if payload.len() < 2 {
        return Err(malformed("record has no targets"));
    }

    let targets = payload[1..]
        .iter()
        .map(|t| parse_target(shard, record, t))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawEntry::new(key, label, targets))
}

fn parse_target(shard: &str, record: usize, value: &Value) -> Result<Target, IndexError> {
    let malformed = |reason: &str| IndexError::malformed(shard, record, reason);

    let parts = value
        .as_array()
        .ok_or_else(|| malformed("target is not an array"))?;
    if !(2..=3).contains(&parts.len()) {
        return Err(malformed("target must be (url, flag) or (url, flag, scope)"));
    }

    let url = parts[0]
        .as_str()
        .ok_or_else(|| malformed("target url is not a string"))?;
    if url.is_empty() {
        return Err(malformed("target url is empty"));
    }

    let external = match &parts[1] {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => return Err(malformed("target flag is not a number")),
    };

    let scope = match parts.get(2) {
        Some(v) => v
            .as_str()
            .ok_or_else(|| malformed("target scope is not a string"))?,
        None => "",
    };

    Ok(Target {
        url: url.to_string(),
        scope: scope.to_string(),
        external,
    })
}

/// Records are three arrays deep; anything far beyond that is garbage
const MAX_DEPTH: usize = 16;

/// Reader for the JavaScript literal subset the generator emits: an optional
/// `var name =` prologue, nested arrays, quoted strings, numbers and
/// `true`/`false`/`null`, with an optional trailing `;`.
struct ScriptParser<'a> {
    shard: &'a str,
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Index of the top-level record being read, for error reporting
    record: usize,
}

impl<'a> ScriptParser<'a> {
    fn new(shard: &'a str, src: &'a str) -> Self {
        Self {
            shard,
            src,
            bytes: src.as_bytes(),
            pos: 0,
            record: 0,
        }
    }

    fn parse(mut self) -> Result<Value, IndexError> {
        self.skip_prologue()?;
        let value = self.parse_value(0)?;

        self.skip_ws();
        if self.peek() == Some(b';') {
            self.pos += 1;
        }
        self.skip_ws();
        if self.pos != self.bytes.len() {
            return Err(self.error("unexpected text after index table"));
        }
        Ok(value)
    }

    fn error(&self, reason: &str) -> IndexError {
        IndexError::malformed(
            self.shard,
            self.record,
            format!("{} (byte {})", reason, self.pos),
        )
    }

    fn skip_prologue(&mut self) -> Result<(), IndexError> {
        self.skip_ws();
        if self.src[self.pos..].starts_with("var")
            && self
                .bytes
                .get(self.pos + 3)
                .map(|b| b.is_ascii_whitespace())
                .unwrap_or(false)
        {
            self.pos += 3;
            self.skip_ws();
            let ident_start = self.pos;
            while let Some(b) = self.peek() {
                if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.pos == ident_start {
                return Err(self.error("expected a variable name"));
            }
            self.skip_ws();
            if self.peek() != Some(b'=') {
                return Err(self.error("expected `=`"));
            }
            self.pos += 1;
        }
        self.skip_ws();
        Ok(())
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value, IndexError> {
        self.skip_ws();
        match self.peek() {
            Some(b'[') => self.parse_array(depth),
            Some(b'\'') | Some(b'"') => self.parse_string().map(Value::String),
            Some(b) if b == b'-' || b.is_ascii_digit() => self.parse_number(),
            Some(b) if b.is_ascii_alphabetic() => self.parse_keyword(),
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Value, IndexError> {
        if depth >= MAX_DEPTH {
            return Err(self.error("arrays nested too deeply"));
        }
        // consume '['
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_ws();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                None => return Err(self.error("unterminated array")),
                _ => {}
            }

            items.push(self.parse_value(depth + 1)?);
            if depth == 0 {
                self.record += 1;
            }

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                None => return Err(self.error("unterminated array")),
                Some(_) => return Err(self.error("expected `,` or `]`")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String, IndexError> {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        let mut out = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(self.error("unterminated string")),
                Some(b) if b == quote => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    return Ok(out);
                }
                Some(b'\\') => {
                    out.push_str(&self.src[run_start..self.pos]);
                    self.pos += 1;
                    out.push(self.parse_escape()?);
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, IndexError> {
        let b = self.peek().ok_or_else(|| self.error("unterminated escape"))?;
        self.pos += 1;
        let ch = match b {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'0' => '\0',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'u' => self.parse_unicode_escape()?,
            b'\\' | b'\'' | b'"' | b'/' => b as char,
            _ => return Err(self.error("invalid escape")),
        };
        Ok(ch)
    }

    /// Decode the code unit after `\u`, joining UTF-16 surrogate pairs the
    /// way JSON readers do. Unpaired surrogates are rejected.
    fn parse_unicode_escape(&mut self) -> Result<char, IndexError> {
        let first = self.read_hex4()?;
        let code = match first {
            0xD800..=0xDBFF => {
                if !self.src[self.pos..].starts_with("\\u") {
                    return Err(self.error("unpaired surrogate in unicode escape"));
                }
                self.pos += 2;
                let second = self.read_hex4()?;
                if !(0xDC00..=0xDFFF).contains(&second) {
                    return Err(self.error("unpaired surrogate in unicode escape"));
                }
                0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
            }
            0xDC00..=0xDFFF => {
                return Err(self.error("unpaired surrogate in unicode escape"));
            }
            code => code,
        };
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape"))
    }

    fn read_hex4(&mut self) -> Result<u32, IndexError> {
        let hex = self
            .src
            .get(self.pos..self.pos + 4)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.error("invalid unicode escape"));
        }
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos += 4;
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<Value, IndexError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || b == b'+' || b == b'-' {
                self.pos += 1;
            } else {
                break;
            }
        }

        let text = &self.src[start..self.pos];
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error("invalid number"))
    }

    fn parse_keyword(&mut self) -> Result<Value, IndexError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphabetic() {
                self.pos += 1;
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => {
                self.pos = start;
                Err(self.error("unexpected identifier"))
            }
        }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }
}
