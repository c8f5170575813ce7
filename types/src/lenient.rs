//! Forgiving field deserializers for scraped dataset rows.
//!
//! Source rows come from external JSON where numbers are sometimes quoted,
//! null, or garbage. A bad field becomes `None` instead of failing the row.

use std::fmt;

use serde::Deserializer;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};

use crate::CompactDate;

/// Loosely typed scalar read from a single JSON field.
enum Loose {
    Float(f64),
    Text(String),
    Nothing,
}

struct LooseVisitor;

impl<'de> Visitor<'de> for LooseVisitor {
    type Value = Loose;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, a numeric string, or null")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Loose, E> {
        Ok(Loose::Nothing)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Loose, E> {
        Ok(Loose::Float(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Loose, E> {
        Ok(Loose::Float(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Loose, E> {
        Ok(Loose::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Loose, E> {
        Ok(Loose::Text(v.trim().to_string()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Loose, E> {
        Ok(Loose::Nothing)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Loose, E> {
        Ok(Loose::Nothing)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Loose, D::Error> {
        d.deserialize_any(LooseVisitor)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Loose, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(Loose::Nothing)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Loose, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(Loose::Nothing)
    }
}

impl Loose {
    fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Loose::Float(v) => *v,
            Loose::Text(s) => s.parse::<f64>().ok()?,
            Loose::Nothing => return None,
        };
        v.is_finite().then_some(v)
    }
}

pub(crate) fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(d.deserialize_any(LooseVisitor)?.as_f64())
}

/// Whole non-negative numbers only; `95.5` is not a percentile bucket.
pub(crate) fn opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    let v = d.deserialize_any(LooseVisitor)?.as_f64();
    Ok(v.filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32))
}

pub(crate) fn opt_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<CompactDate>, D::Error> {
    Ok(match d.deserialize_any(LooseVisitor)? {
        Loose::Text(s) => CompactDate::parse(&s),
        Loose::Float(v) if v.fract() == 0.0 && v >= 0.0 => CompactDate::parse(&format!("{v:.0}")),
        _ => None,
    })
}
