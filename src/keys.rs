//! Interned property keys for the well-known names the function machinery
//! touches.
//!
//! Every key is a `static`, so a lookup hands back the same reference for the
//! lifetime of the process and keys compare equal to their literal text.

use rustc_hash::FxHashMap;
use std::borrow::Borrow;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Key {
    name: &'static str,
}

impl Key {
    const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn as_str(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        self.name
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.name
    }
}

pub static ARGUMENTS: Key = Key::new("arguments");
pub static CALLER: Key = Key::new("caller");
pub static CONSTRUCTOR: Key = Key::new("constructor");
pub static DEFAULT: Key = Key::new("default");
pub static DONE: Key = Key::new("done");
pub static EVAL: Key = Key::new("eval");
pub static LENGTH: Key = Key::new("length");
pub static NAME: Key = Key::new("name");
pub static NEXT: Key = Key::new("next");
pub static PROTOTYPE: Key = Key::new("prototype");
pub static UNDEFINED: Key = Key::new("undefined");
pub static VALUE: Key = Key::new("value");

static WELL_KNOWN: [&Key; 12] = [
    &ARGUMENTS,
    &CALLER,
    &CONSTRUCTOR,
    &DEFAULT,
    &DONE,
    &EVAL,
    &LENGTH,
    &NAME,
    &NEXT,
    &PROTOTYPE,
    &UNDEFINED,
    &VALUE,
];

static REGISTRY: LazyLock<FxHashMap<&'static str, &'static Key>> =
    LazyLock::new(|| WELL_KNOWN.iter().map(|key| (key.as_str(), *key)).collect());

/// Returns the interned key for `name`, if it is one of the well-known names.
pub fn lookup(name: &str) -> Option<&'static Key> {
    REGISTRY.get(name).copied()
}

pub fn well_known() -> impl Iterator<Item = &'static Key> {
    WELL_KNOWN.iter().copied()
}
