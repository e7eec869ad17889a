//! String interner owned by one parse session.
//!
//! A session is single-threaded, so the interner is a plain map plus a
//! vector of owned strings and is mutated through `&mut`.

use super::Name;
use rustc_hash::FxHashMap;

/// Read-only access to interned text.
pub trait StringLookup {
    fn lookup(&self, name: Name) -> &str;
}

/// Maps identifier text to [`Name`] handles and back.
#[derive(Clone, Debug)]
pub struct StringInterner {
    map: FxHashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    pub fn new() -> Self {
        let mut interner = StringInterner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        interner.strings.push(Box::from(""));
        interner.map.insert(Box::from(""), Name::EMPTY);
        interner
    }

    /// Intern `text`, returning the existing handle when already present.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.map.get(text) {
            return name;
        }
        let name = Name::from_raw(u32::try_from(self.strings.len()).unwrap_or(u32::MAX));
        self.strings.push(Box::from(text));
        self.map.insert(Box::from(text), name);
        name
    }

    /// Intern raw source bytes, replacing invalid UTF-8 sequences.
    pub fn intern_bytes(&mut self, bytes: &[u8]) -> Name {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.intern(text),
            Err(_) => {
                let text = String::from_utf8_lossy(bytes);
                self.intern(&text)
            }
        }
    }

    /// Look up a name without interning it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.map.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| s)
    }
}
