//! Access-path rendering for failure messages.

use crate::object_model::PropertyKey;

/// Which part of a property descriptor a recursive guard stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorPart {
    Value,
    Get,
    Set,
}

impl DescriptorPart {
    fn suffix(self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Get => "get",
            Self::Set => "set",
        }
    }
}

/// `[$A-Z_a-z][\w$]*`, ASCII only.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '$' || first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '$' || c == '_' || c.is_ascii_alphanumeric())
}

/// Extend `base` with one property access.
///
/// Member notation for identifiers, bare brackets for a single digit,
/// quoted brackets for everything else.  Symbols render in bare brackets.
pub fn prop_path(base: &str, key: &PropertyKey) -> String {
    match key {
        PropertyKey::String(s) if is_identifier(s) => format!("{base}.{s}"),
        PropertyKey::String(s) if s.len() == 1 && s.as_bytes()[0].is_ascii_digit() => {
            format!("{base}[{s}]")
        }
        PropertyKey::String(s) => format!("{base}[\"{s}\"]"),
        PropertyKey::Symbol(_) => format!("{base}[{key}]"),
    }
}

/// Path of a call through `base`.
pub fn call_path(base: &str) -> String {
    format!("{base}()")
}

/// Path of a descriptor part of `key` on `base`, e.g. `target.a.descriptor.get`.
pub fn descriptor_path(base: &str, key: &PropertyKey, part: DescriptorPart) -> String {
    format!("{}.descriptor.{}", prop_path(base, key), part.suffix())
}
