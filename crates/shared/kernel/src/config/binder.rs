//! Section binder: a `serde` deserializer over a tree of settings keys.
//!
//! Struct fields and enum variants are matched ASCII case-insensitively, scalars are
//! parsed from their string form and numeric child keys bind into sequences.
//! Keys that match no field are handed to `serde` unchanged, so they are ignored
//! unless the target type denies unknown fields.

use super::source::KEY_DELIMITER;
use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// Failure to convert a settings value into its target type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}{message}", .path.as_ref().map(|p| format!("'{p}': ")).unwrap_or_default())]
pub struct BindError {
    path: Option<String>,
    message: String,
}

impl BindError {
    fn at(path: &str, message: impl Display) -> Self {
        Self { path: Some(path.to_owned()), message: message.to_string() }
    }

    /// Full key of the offending value, when known.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl de::Error for BindError {
    fn custom<T: Display>(msg: T) -> Self {
        Self { path: None, message: msg.to_string() }
    }
}

#[derive(Debug, Default, Clone)]
struct Node {
    value: Option<String>,
    /// Children keyed by lower-cased segment, keeping the original spelling.
    children: BTreeMap<String, (String, Node)>,
}

impl Node {
    fn insert<'a>(&mut self, mut segments: impl Iterator<Item = &'a str>, value: &str) {
        match segments.next() {
            None => self.value = Some(value.to_owned()),
            Some(segment) => {
                let (_, child) = self
                    .children
                    .entry(segment.to_ascii_lowercase())
                    .or_insert_with(|| (segment.to_owned(), Self::default()));
                child.insert(segments, value);
            },
        }
    }

    fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

/// The settings found under one key prefix.
#[derive(Debug, Clone)]
pub struct Section {
    path: String,
    root: Node,
}

impl Section {
    pub(crate) fn new<'a>(path: String, entries: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        let mut root = Node::default();
        for (key, value) in entries {
            root.insert(key.split(KEY_DELIMITER), value);
        }
        Self { path, root }
    }

    /// Full key of the section.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if at least one key lives under the section.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.root.children.is_empty()
    }

    /// Immediate child key names, in their original spelling.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.children.values().map(|(name, _)| name.as_str())
    }

    /// Copies the section into a fresh `T`. An absent section yields `T::default()`.
    ///
    /// # Errors
    /// Returns [`BindError`] if a value cannot be converted to its field type.
    pub fn bind<T>(&self) -> Result<T, BindError>
    where
        T: DeserializeOwned + Default,
    {
        if !self.exists() {
            return Ok(T::default());
        }
        T::deserialize(NodeDeserializer { node: &self.root, path: self.path.clone() })
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() { name.to_owned() } else { format!("{parent}{KEY_DELIMITER}{name}") }
}

struct NodeDeserializer<'n> {
    node: &'n Node,
    path: String,
}

impl NodeDeserializer<'_> {
    fn leaf(&self) -> Result<&str, BindError> {
        self.node
            .value
            .as_deref()
            .ok_or_else(|| BindError::at(&self.path, "expected a value, found a section"))
    }

    fn parse<T>(&self, expected: &str) -> Result<T, BindError>
    where
        T: std::str::FromStr,
    {
        let raw = self.leaf()?;
        raw.trim()
            .parse::<T>()
            .map_err(|_| BindError::at(&self.path, format!("'{raw}' is not a valid {expected}")))
    }

    fn entries(&self) -> NodeMap<'_> {
        let entries = self
            .node
            .children
            .values()
            .map(|(name, node)| (name.clone(), node, child_path(&self.path, name)))
            .collect::<Vec<_>>();
        NodeMap { entries: entries.into_iter(), pending: None }
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                visitor.$visit(self.parse::<$ty>(stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for NodeDeserializer<'_> {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if !self.node.children.is_empty() {
            return visitor.visit_map(self.entries());
        }
        match &self.node.value {
            Some(value) => visitor.visit_str(value),
            None => visitor.visit_unit(),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let raw = self.leaf()?.trim();
        if raw.eq_ignore_ascii_case("true") {
            visitor.visit_bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            visitor.visit_bool(false)
        } else {
            Err(BindError::at(&self.path, format!("'{raw}' is not a valid bool")))
        }
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_str(self.leaf()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_bytes(self.leaf()?.as_bytes())
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        if self.node.is_empty() { visitor.visit_none() } else { visitor.visit_some(self) }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        let mut items = self
            .node
            .children
            .values()
            .filter_map(|(name, node)| name.parse::<usize>().ok().map(|index| (index, name, node)))
            .collect::<Vec<_>>();
        items.sort_by_key(|(index, ..)| *index);

        let items = items
            .into_iter()
            .map(|(_, name, node)| (node, child_path(&self.path, name)))
            .collect::<Vec<_>>();
        visitor.visit_seq(NodeSeq { items: items.into_iter() })
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_map(self.entries())
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let mut map = self.entries();
        // Hand serde the canonical field name so matching is case-insensitive.
        map.entries = map
            .entries
            .map(|(key, node, path)| {
                let key = fields
                    .iter()
                    .find(|field| field.eq_ignore_ascii_case(&key))
                    .map_or(key, |field| (*field).to_owned());
                (key, node, path)
            })
            .collect::<Vec<_>>()
            .into_iter();
        visitor.visit_map(map)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        let raw = self.leaf()?.trim();
        let variant = variants
            .iter()
            .find(|variant| variant.eq_ignore_ascii_case(raw))
            .map_or_else(|| raw.to_owned(), |variant| (*variant).to_owned());
        let variant: StringDeserializer<BindError> = variant.into_deserializer();
        visitor.visit_enum(variant).map_err(|e| BindError::at(&self.path, e))
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }
}

struct NodeMap<'n> {
    entries: std::vec::IntoIter<(String, &'n Node, String)>,
    pending: Option<(&'n Node, String)>,
}

impl<'de> MapAccess<'de> for NodeMap<'_> {
    type Error = BindError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let Some((key, node, path)) = self.entries.next() else {
            return Ok(None);
        };
        self.pending = Some((node, path));
        let key: StringDeserializer<BindError> = key.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let (node, path) = self
            .pending
            .take()
            .ok_or_else(|| <BindError as de::Error>::custom("value requested before key"))?;
        seed.deserialize(NodeDeserializer { node, path })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct NodeSeq<'n> {
    items: std::vec::IntoIter<(&'n Node, String)>,
}

impl<'de> SeqAccess<'de> for NodeSeq<'_> {
    type Error = BindError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        self.items
            .next()
            .map(|(node, path)| seed.deserialize(NodeDeserializer { node, path }))
            .transpose()
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} keys)", self.path, self.root.children.len())
    }
}
