use std::collections::BTreeMap;
use std::fmt;

use log::kv::{self, Key, Value, VisitSource};

/// Field carrying the caller-supplied event id.
pub const EVENT_ID_FIELD: &str = "event_id";

pub const DEFAULT_EVENT_ID: u32 = 1;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    fn from_kv(value: &Value<'_>) -> Self {
        if let Some(s) = value.to_borrowed_str() {
            FieldValue::Str(s.to_string())
        } else if let Some(b) = value.to_bool() {
            FieldValue::Bool(b)
        } else if let Some(i) = value.to_i64() {
            FieldValue::Int(i)
        } else if let Some(u) = value.to_u64() {
            FieldValue::UInt(u)
        } else if let Some(f) = value.to_f64() {
            FieldValue::Float(f)
        } else {
            FieldValue::Str(value.to_string())
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::Int(value as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(impl From<$ty> for FieldValue {
            fn from(value: $ty) -> Self {
                FieldValue::UInt(value as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

/// Typed extraction from a loosely-typed field value. Returns `None` on a type
/// mismatch or a failed parse.
pub trait FromFieldValue: Sized {
    fn from_field_value(value: &FieldValue) -> Option<Self>;
}

impl FromFieldValue for String {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromFieldValue for i64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match *value {
            FieldValue::Int(i) => Some(i),
            FieldValue::UInt(u) => i64::try_from(u).ok(),
            _ => None,
        }
    }
}

impl FromFieldValue for u64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match *value {
            FieldValue::UInt(u) => Some(u),
            FieldValue::Int(i) => u64::try_from(i).ok(),
            _ => None,
        }
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match *value {
            FieldValue::Float(f) => Some(f),
            _ => None,
        }
    }
}

impl FromFieldValue for bool {
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        match *value {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

/// Application-defined event id attached to every event log write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(pub u32);

impl Default for EventId {
    fn default() -> Self {
        EventId(DEFAULT_EVENT_ID)
    }
}

impl FromFieldValue for EventId {
    /// Only decimal strings are accepted; numeric fields are ignored.
    fn from_field_value(value: &FieldValue) -> Option<Self> {
        let FieldValue::Str(s) = value else {
            return None;
        };
        let id = s.parse::<u64>().ok()?;
        u32::try_from(id).ok().map(EventId)
    }
}

/// Field name to value, kept sorted by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the key/values attached to a `log` record.
    pub fn from_kv(source: &dyn kv::Source) -> Self {
        struct Collect<'a>(&'a mut Fields);

        impl<'kvs> VisitSource<'kvs> for Collect<'_> {
            fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
                self.0.insert(key.as_str(), FieldValue::from_kv(&value));
                Ok(())
            }
        }

        let mut fields = Fields::new();
        // Collect never fails, so neither can the visit.
        let _ = source.visit(&mut Collect(&mut fields));
        fields
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_as<T: FromFieldValue>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(T::from_field_value)
    }

    pub fn get_or_default<T: FromFieldValue + Default>(&self, key: &str) -> T {
        self.get_as(key).unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
