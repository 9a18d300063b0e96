//! # Attribute Access
//!
//! Catalog records do not agree on attribute names: the same socket may live
//! under `specifications.socket`, `specifications.Socket` or
//! `compatibility.socket`. Rules never index the maps directly. They ask for a
//! logical [`Attribute`] and this module walks its alias list in priority order.
//!
//! Numeric reads go through [`parse_int_or`], so every rule substitutes
//! defaults the same way and nothing in evaluation can fail.

use crate::{Component, SpecValue};

// =============================================================================
// ALIAS TABLES
// =============================================================================

/// Which map of a [`Component`] an alias points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Specifications,
    Compatibility,
}

/// Logical attributes read by the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// CPU or motherboard socket.
    Socket,
    /// Memory type of a RAM kit.
    MemoryType,
    /// Memory type a motherboard accepts.
    SupportedMemoryType,
    /// RAM kit capacity in GB.
    Capacity,
    /// Motherboard memory ceiling in GB.
    MaxMemory,
    /// Minimum PSU rating a GPU asks for.
    MinPsuWattage,
    /// PSU rating.
    Wattage,
    /// Storage bus.
    StorageInterface,
    /// Free-text description of motherboard expansion slots.
    PciSlots,
    /// CPU thermal design power.
    Tdp,
    /// GPU board power.
    PowerDraw,
}

use Source::{Compatibility as C, Specifications as S};

impl Attribute {
    /// Aliases tried in order by [`read_attribute`].
    #[must_use]
    pub fn aliases(&self) -> &'static [(Source, &'static str)] {
        match self {
            Attribute::Socket => &[(S, "socket"), (S, "Socket"), (C, "socket")],
            Attribute::MemoryType => &[
                (S, "type"),
                (S, "Type"),
                (S, "memoryType"),
                (C, "ramType"),
            ],
            Attribute::SupportedMemoryType => &[
                (C, "ramType"),
                (S, "memoryType"),
                (S, "ramType"),
                (S, "memory_type"),
            ],
            Attribute::Capacity => &[(S, "capacity"), (S, "Capacity")],
            Attribute::MaxMemory => &[(S, "maxRam"), (S, "maxMemory"), (C, "maxRam")],
            Attribute::MinPsuWattage => &[
                (C, "minPsu"),
                (S, "minPsu"),
                (S, "recommendedPsu"),
            ],
            Attribute::Wattage => &[(S, "wattage"), (S, "Wattage"), (C, "wattage")],
            Attribute::StorageInterface => &[(S, "interface"), (S, "Interface")],
            Attribute::PciSlots => &[
                (S, "pciSlots"),
                (S, "pcieSlots"),
                (S, "expansionSlots"),
            ],
            Attribute::Tdp => &[(S, "tdp"), (S, "TDP"), (C, "tdp")],
            Attribute::PowerDraw => &[(S, "powerDraw"), (S, "tdp"), (S, "TDP")],
        }
    }
}

// =============================================================================
// READERS
// =============================================================================

/// First value found for `attribute`, walking its aliases in order.
#[must_use]
pub fn read_attribute<'a>(component: &'a Component, attribute: Attribute) -> Option<&'a SpecValue> {
    attribute.aliases().iter().find_map(|(source, key)| match source {
        Source::Specifications => component.specifications.get(*key),
        Source::Compatibility => component.compatibility.as_ref()?.get(*key),
    })
}

/// Attribute rendered as text. Empty strings count as absent.
#[must_use]
pub fn read_text(component: &Component, attribute: Attribute) -> Option<String> {
    read_attribute(component, attribute)
        .map(ToString::to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Attribute parsed as an integer, `default` when absent or not numeric.
#[must_use]
pub fn read_int(component: &Component, attribute: Attribute, default: i64) -> i64 {
    parse_int_or(read_attribute(component, attribute), default)
}

// =============================================================================
// NUMERIC PARSING
// =============================================================================

/// Parse a specification value as an integer, substituting `default`.
///
/// - `Integer(n)` → `n`
/// - `Decimal(d)` → `d` truncated toward zero (non-finite → `default`)
/// - `Text(s)` → the leading integer of `s` after leading whitespace, so
///   `"650W"` → 650 and `"32 GB"` → 32; no leading digits → `default`
/// - `List(_)` or absent → `default`
#[must_use]
pub fn parse_int_or(value: Option<&SpecValue>, default: i64) -> i64 {
    match value {
        Some(SpecValue::Integer(n)) => *n,
        Some(SpecValue::Decimal(d)) if d.is_finite() => *d as i64,
        Some(SpecValue::Text(s)) => leading_integer(s).unwrap_or(default),
        _ => default,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long digit runs instead of failing.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryId, Price};

    fn cpu() -> Component {
        Component::new("cpu-1", CategoryId::Cpu, "Test CPU", Price(10_000))
    }

    #[test]
    fn parse_strips_unit_suffix() {
        assert_eq!(parse_int_or(Some(&"650W".into()), 0), 650);
        assert_eq!(parse_int_or(Some(&"32 GB".into()), 0), 32);
        assert_eq!(parse_int_or(Some(&"  16GB".into()), 0), 16);
    }

    #[test]
    fn parse_falls_back_to_default() {
        assert_eq!(parse_int_or(None, 128), 128);
        assert_eq!(parse_int_or(Some(&"DDR4".into()), 7), 7);
        assert_eq!(parse_int_or(Some(&"".into()), 7), 7);
        assert_eq!(parse_int_or(Some(&"-".into()), 7), 7);
        assert_eq!(
            parse_int_or(Some(&SpecValue::List(vec!["1".into()])), 7),
            7
        );
        assert_eq!(parse_int_or(Some(&SpecValue::Decimal(f64::NAN)), 7), 7);
    }

    #[test]
    fn parse_handles_numbers_and_signs() {
        assert_eq!(parse_int_or(Some(&SpecValue::Integer(850)), 0), 850);
        assert_eq!(parse_int_or(Some(&SpecValue::Decimal(3.9)), 0), 3);
        assert_eq!(parse_int_or(Some(&"-12".into()), 0), -12);
        assert_eq!(parse_int_or(Some(&"+5V".into()), 0), 5);
    }

    #[test]
    fn specifications_alias_wins_over_compatibility() {
        let c = cpu()
            .with_spec("socket", "AM5")
            .with_compat("socket", "AM4");
        assert_eq!(read_text(&c, Attribute::Socket).as_deref(), Some("AM5"));
    }

    #[test]
    fn capitalized_alias_is_found() {
        let c = cpu().with_spec("Socket", "LGA1700");
        assert_eq!(read_text(&c, Attribute::Socket).as_deref(), Some("LGA1700"));
    }

    #[test]
    fn compatibility_alias_is_fallback() {
        let c = cpu().with_compat("socket", "AM4");
        assert_eq!(read_text(&c, Attribute::Socket).as_deref(), Some("AM4"));
    }

    #[test]
    fn missing_attribute_reads_as_none_or_default() {
        let c = cpu();
        assert!(read_attribute(&c, Attribute::Socket).is_none());
        assert_eq!(read_int(&c, Attribute::Tdp, 65), 65);
    }

    #[test]
    fn blank_text_counts_as_absent() {
        let c = cpu().with_spec("socket", "   ");
        assert!(read_text(&c, Attribute::Socket).is_none());
    }
}
