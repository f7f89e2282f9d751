//! Content-addressed style-variable table.
//!
//! Nodes never carry style payloads inline. Each fragment (text style, fills,
//! stroke bundle, effects) is interned here and the node keeps only the id.
//! Two fragments that are deeply equal share one entry, whatever the key
//! order of their objects or the spelling of their numbers (`1` vs `1.0`).
//!
//! Lookup goes through a hash index keyed by the canonical serialization, so
//! interning is O(size of the value), not O(size of the table).

use crate::config::IdStrategy;
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Write;

/// Length of the generated part of an id.
const SUFFIX_LEN: usize = 6;

/// Which kind of fragment an entry holds. Determines the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleCategory {
    /// Text style (`style_…`).
    Style,
    /// Fill paints (`fill_…`).
    Fill,
    /// Stroke paints + weight + alignment (`stroke_…`).
    Stroke,
    /// Shadows and blurs (`effect_…`).
    Effect,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 4] = [Self::Style, Self::Fill, Self::Stroke, Self::Effect];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Style => "style",
            Self::Fill => "fill",
            Self::Stroke => "stroke",
            Self::Effect => "effect",
        }
    }

    /// Recover the category from an id produced by this table.
    pub fn of_id(id: &str) -> Option<Self> {
        let (prefix, _) = id.rsplit_once('_')?;
        Self::ALL.into_iter().find(|c| c.prefix() == prefix)
    }
}

// ─── Id generation ───────────────────────────────────────────────────────

enum IdSource {
    Random(StdRng),
    ContentHash,
}

impl IdSource {
    fn new(strategy: IdStrategy) -> Self {
        match strategy {
            IdStrategy::Random => Self::Random(StdRng::from_os_rng()),
            IdStrategy::Seeded(seed) => Self::Random(StdRng::seed_from_u64(seed)),
            IdStrategy::ContentHash => Self::ContentHash,
        }
    }

    /// Candidate suffix for the `attempt`-th try at naming `key`.
    fn suffix(&mut self, prefix: &str, key: &str, attempt: u32) -> String {
        match self {
            Self::Random(rng) => (0..SUFFIX_LEN)
                .map(|_| char::from(rng.sample(Alphanumeric)))
                .collect(),
            Self::ContentHash => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(prefix.as_bytes());
                hasher.update(&attempt.to_le_bytes());
                hasher.update(key.as_bytes());
                hash_suffix(hasher.finalize().as_bytes())
            }
        }
    }
}

/// Map digest bytes onto `[A-Za-z0-9]`.
fn hash_suffix(bytes: &[u8]) -> String {
    const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    bytes
        .iter()
        .take(SUFFIX_LEN)
        .map(|b| char::from(ALPHABET[usize::from(*b) % ALPHABET.len()]))
        .collect()
}

// ─── Table ───────────────────────────────────────────────────────────────

/// The deduplicated style-variable table for one build.
///
/// Not `Sync`-shared: each build owns its table and its id generator.
pub struct StyleTable {
    /// id → value, in insertion order.
    styles: Map<String, Value>,
    /// canonical key → id.
    index: HashMap<String, String>,
    ids: IdSource,
}

impl StyleTable {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            styles: Map::new(),
            index: HashMap::new(),
            ids: IdSource::new(strategy),
        }
    }

    /// Return the id of an entry deeply equal to `value`, inserting it first
    /// if the table has none.
    pub fn intern(&mut self, value: Value, category: StyleCategory) -> String {
        let key = canonical_key(&value);
        if let Some(id) = self.index.get(&key) {
            return id.clone();
        }

        let prefix = category.prefix();
        let mut attempt = 0u32;
        let id = loop {
            let candidate = format!("{prefix}_{}", self.ids.suffix(prefix, &key, attempt));
            if !self.styles.contains_key(&candidate) {
                break candidate;
            }
            log::trace!("style id collision on {candidate}, regenerating");
            attempt += 1;
        };

        log::trace!("interned new {prefix} variable {id}");
        self.styles.insert(id.clone(), value);
        self.index.insert(key, id.clone());
        id
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.styles.get(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.styles.iter().map(|(id, v)| (id.as_str(), v))
    }

    /// Number of entries of one category.
    pub fn count(&self, category: StyleCategory) -> usize {
        self.styles
            .keys()
            .filter(|id| StyleCategory::of_id(id) == Some(category))
            .count()
    }

    /// Finish the build and hand over the id → value map.
    pub fn into_styles(self) -> Map<String, Value> {
        self.styles
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new(IdStrategy::default())
    }
}

impl std::fmt::Debug for StyleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.styles.iter()).finish()
    }
}

// ─── Canonical serialization ─────────────────────────────────────────────

/// A string that is equal for two values iff they are deeply equal.
///
/// Object keys are sorted. Numbers are compared by their `f64` value, so
/// `8` and `8.0` collapse. Strings are JSON-escaped so no separator can be
/// forged from inside a value.
pub fn canonical_key(value: &Value) -> String {
    let mut out = String::with_capacity(64);
    write_canonical(&mut out, value);
    out
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                let _ = write!(out, "{f:?}");
            }
            None => {
                let _ = write!(out, "{n}");
            }
        },
        Value::String(s) => write_json_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(out, key);
                out.push(':');
                write_canonical(out, item);
            }
            out.push('}');
        }
    }
}

fn write_json_string(out: &mut String, s: &str) {
    // Serializing a &str cannot fail.
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str(s),
    }
}
