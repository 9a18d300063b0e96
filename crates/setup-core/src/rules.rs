//! # Compatibility Rule Set
//!
//! Six independent rules, each looking at a few selected categories and
//! producing at most one issue plus zero or more suggestions.
//!
//! | Rule | Categories | Severity |
//! |------|------------|----------|
//! | Socket | cpu × motherboard | Incompatible |
//! | Memory type | ram × motherboard | Incompatible |
//! | Memory capacity | ram × motherboard | Incompatible |
//! | PSU wattage | gpu × psu | Incompatible |
//! | Storage interface | storage × motherboard | Advisory |
//! | Power budget | cpu, gpu, psu (≥4 populated) | Incompatible |
//!
//! [`evaluate`] is a pure function of the selection and the catalog. It is
//! re-run in full after every mutation; selections have at most seven slots.
//! Missing or malformed attributes resolve to the defaults in
//! [`crate::primitives`]. Nothing here can fail.

use crate::attributes::{Attribute, read_int, read_text};
use crate::primitives::{
    DEFAULT_CPU_TDP_WATTS, DEFAULT_GPU_DRAW_WATTS, DEFAULT_MAX_MEMORY_GB, DEFAULT_MEMORY_TYPE,
    FALLBACK_STORAGE_INTERFACES, FAST_STORAGE_INTERFACE, PCIE_SLOT_MARKER,
    PLATFORM_OVERHEAD_WATTS, POWER_BUDGET_MIN_POPULATED, PSU_LOAD_LIMIT_PERCENT,
};
use crate::resolver::{CompatibilitySuggestion, Resolver};
use crate::{Catalog, CategoryId, Component, Selection};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// RULE KINDS
// =============================================================================

/// Identifies the rule behind an issue or suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    Socket,
    MemoryType,
    MemoryCapacity,
    PowerSupply,
    StorageInterface,
    PowerBudget,
}

impl RuleKind {
    /// Evaluation order.
    pub const ALL: [RuleKind; 6] = [
        RuleKind::Socket,
        RuleKind::MemoryType,
        RuleKind::MemoryCapacity,
        RuleKind::PowerSupply,
        RuleKind::StorageInterface,
        RuleKind::PowerBudget,
    ];

    /// Stable code used on the wire.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            RuleKind::Socket => "socket",
            RuleKind::MemoryType => "memory-type",
            RuleKind::MemoryCapacity => "memory-capacity",
            RuleKind::PowerSupply => "power-supply",
            RuleKind::StorageInterface => "storage-interface",
            RuleKind::PowerBudget => "power-budget",
        }
    }

    /// Severity of the issues this rule raises.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            RuleKind::StorageInterface => Severity::Advisory,
            _ => Severity::Incompatible,
        }
    }

    fn check(&self, selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
        match self {
            RuleKind::Socket => check_socket(selection, resolver, out),
            RuleKind::MemoryType => check_memory_type(selection, resolver, out),
            RuleKind::MemoryCapacity => check_memory_capacity(selection, resolver, out),
            RuleKind::PowerSupply => check_power_supply(selection, resolver, out),
            RuleKind::StorageInterface => check_storage_interface(selection, resolver, out),
            RuleKind::PowerBudget => check_power_budget(selection, resolver, out),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The parts will not work together as selected.
    Incompatible,
    /// The parts work, but not at their best.
    Advisory,
}

// =============================================================================
// EVALUATION OUTPUT
// =============================================================================

/// A detected conflict or advisory. Regenerated on every evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityIssue {
    pub rule: RuleKind,
    pub severity: Severity,
    pub message: String,
}

/// Issues and suggestions for one selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub issues: Vec<CompatibilityIssue>,
    pub suggestions: Vec<CompatibilitySuggestion>,
}

impl Evaluation {
    /// No issues of any severity.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.issues.is_empty()
    }

    /// At least one issue that is more than advisory.
    #[must_use]
    pub fn has_blocking_issues(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == Severity::Incompatible)
    }

    /// Issues raised by `rule`.
    pub fn issues_for(&self, rule: RuleKind) -> impl Iterator<Item = &CompatibilityIssue> {
        self.issues.iter().filter(move |i| i.rule == rule)
    }

    /// Suggestions produced by `rule`.
    pub fn suggestions_for(
        &self,
        rule: RuleKind,
    ) -> impl Iterator<Item = &CompatibilitySuggestion> {
        self.suggestions.iter().filter(move |s| s.rule == rule)
    }

    fn issue(&mut self, rule: RuleKind, message: String) {
        self.issues.push(CompatibilityIssue {
            rule,
            severity: rule.severity(),
            message,
        });
    }

    fn suggest(&mut self, suggestion: Option<CompatibilitySuggestion>) {
        self.suggestions.extend(suggestion);
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Run every rule against `selection`, resolving fixes from `catalog`.
#[must_use]
pub fn evaluate(selection: &Selection, catalog: &Catalog) -> Evaluation {
    let resolver = Resolver::new(catalog);
    let mut out = Evaluation::default();
    for rule in RuleKind::ALL {
        rule.check(selection, resolver, &mut out);
    }
    tracing::debug!(
        populated = selection.len(),
        issues = out.issues.len(),
        suggestions = out.suggestions.len(),
        "compatibility evaluated"
    );
    out
}

fn pair(
    selection: &Selection,
    a: CategoryId,
    b: CategoryId,
) -> Option<(&Component, &Component)> {
    Some((selection.get(a)?, selection.get(b)?))
}

fn supported_memory_type(board: &Component) -> String {
    read_text(board, Attribute::SupportedMemoryType)
        .unwrap_or_else(|| DEFAULT_MEMORY_TYPE.to_string())
}

fn text_is(component: &Component, attribute: Attribute, expected: &str) -> bool {
    read_text(component, attribute).as_deref() == Some(expected)
}

// =============================================================================
// RULE 1: SOCKET
// =============================================================================

fn check_socket(selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
    let Some((cpu, board)) = pair(selection, CategoryId::Cpu, CategoryId::Motherboard) else {
        return;
    };
    let (Some(cpu_socket), Some(board_socket)) = (
        read_text(cpu, Attribute::Socket),
        read_text(board, Attribute::Socket),
    ) else {
        return;
    };
    if cpu_socket == board_socket {
        return;
    }

    out.issue(
        RuleKind::Socket,
        format!(
            "Socket mismatch: CPU socket {} vs motherboard socket {}",
            cpu_socket, board_socket
        ),
    );

    // Both directions are offered; either one fixes the build.
    out.suggest(resolver.suggest(
        RuleKind::Socket,
        CategoryId::Motherboard,
        |c| text_is(c, Attribute::Socket, &cpu_socket),
        |c| format!("Switch to the {} motherboard ({} socket)", c.name, cpu_socket),
    ));
    out.suggest(resolver.suggest(
        RuleKind::Socket,
        CategoryId::Cpu,
        |c| text_is(c, Attribute::Socket, &board_socket),
        |c| format!("Switch to the {} CPU ({} socket)", c.name, board_socket),
    ));
}

// =============================================================================
// RULE 2: MEMORY TYPE
// =============================================================================

fn check_memory_type(selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
    let Some((ram, board)) = pair(selection, CategoryId::Ram, CategoryId::Motherboard) else {
        return;
    };
    let Some(ram_type) = read_text(ram, Attribute::MemoryType) else {
        return;
    };
    let board_type = supported_memory_type(board);
    if ram_type == board_type {
        return;
    }

    out.issue(
        RuleKind::MemoryType,
        format!(
            "Memory type mismatch: RAM is {} but the motherboard supports {}",
            ram_type, board_type
        ),
    );
    out.suggest(resolver.suggest(
        RuleKind::MemoryType,
        CategoryId::Ram,
        |c| text_is(c, Attribute::MemoryType, &board_type),
        |c| format!("Switch to {} ({})", c.name, board_type),
    ));
}

// =============================================================================
// RULE 3: MEMORY CAPACITY
// =============================================================================

fn check_memory_capacity(selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
    let Some((ram, board)) = pair(selection, CategoryId::Ram, CategoryId::Motherboard) else {
        return;
    };
    let capacity = read_int(ram, Attribute::Capacity, 0);
    let ceiling = read_int(board, Attribute::MaxMemory, DEFAULT_MAX_MEMORY_GB);
    if capacity <= ceiling {
        return;
    }

    out.issue(
        RuleKind::MemoryCapacity,
        format!(
            "Memory capacity {}GB exceeds the motherboard maximum of {}GB",
            capacity, ceiling
        ),
    );
    // The replacement must fit the ceiling and the board's memory type.
    let board_type = supported_memory_type(board);
    out.suggest(resolver.suggest(
        RuleKind::MemoryCapacity,
        CategoryId::Ram,
        |c| {
            read_int(c, Attribute::Capacity, 0) <= ceiling
                && text_is(c, Attribute::MemoryType, &board_type)
        },
        |c| {
            format!(
                "Switch to {} ({}GB {})",
                c.name,
                read_int(c, Attribute::Capacity, 0),
                board_type
            )
        },
    ));
}

// =============================================================================
// RULE 4: POWER SUPPLY WATTAGE
// =============================================================================

fn check_power_supply(selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
    let Some((gpu, psu)) = pair(selection, CategoryId::Gpu, CategoryId::Psu) else {
        return;
    };
    let required = read_int(gpu, Attribute::MinPsuWattage, 0);
    let wattage = read_int(psu, Attribute::Wattage, 0);
    // 0 on either side means "not declared".
    if required <= 0 || wattage <= 0 || required <= wattage {
        return;
    }

    out.issue(
        RuleKind::PowerSupply,
        format!(
            "Power supply too weak: the GPU requires at least {}W but the PSU provides {}W",
            required, wattage
        ),
    );
    out.suggest(resolver.suggest(
        RuleKind::PowerSupply,
        CategoryId::Psu,
        |c| read_int(c, Attribute::Wattage, 0) >= required,
        |c| {
            format!(
                "Switch to the {} power supply ({}W)",
                c.name,
                read_int(c, Attribute::Wattage, 0)
            )
        },
    ));
}

// =============================================================================
// RULE 5: STORAGE INTERFACE (ADVISORY)
// =============================================================================

fn check_storage_interface(selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
    let Some((storage, board)) = pair(selection, CategoryId::Storage, CategoryId::Motherboard)
    else {
        return;
    };
    if !text_is(storage, Attribute::StorageInterface, FAST_STORAGE_INTERFACE) {
        return;
    }
    // An undeclared slot description counts as "no PCIe slot".
    let slots = read_text(board, Attribute::PciSlots).unwrap_or_default();
    if slots.contains(PCIE_SLOT_MARKER) {
        return;
    }

    out.issue(
        RuleKind::StorageInterface,
        format!(
            "{} storage will not reach full speed: the motherboard lists no PCIe slots",
            FAST_STORAGE_INTERFACE
        ),
    );
    out.suggest(resolver.suggest(
        RuleKind::StorageInterface,
        CategoryId::Storage,
        |c| {
            read_text(c, Attribute::StorageInterface)
                .is_some_and(|i| FALLBACK_STORAGE_INTERFACES.contains(&i.as_str()))
        },
        |c| {
            format!(
                "Switch to {} ({})",
                c.name,
                read_text(c, Attribute::StorageInterface).unwrap_or_default()
            )
        },
    ));
}

// =============================================================================
// RULE 6: POWER BUDGET
// =============================================================================

/// Estimated system draw in watts: CPU TDP + GPU board power + platform overhead.
#[must_use]
pub fn estimated_draw_watts(selection: &Selection) -> i64 {
    let cpu = selection
        .get(CategoryId::Cpu)
        .map(|c| read_int(c, Attribute::Tdp, DEFAULT_CPU_TDP_WATTS))
        .unwrap_or(DEFAULT_CPU_TDP_WATTS);
    let gpu = selection
        .get(CategoryId::Gpu)
        .map(|c| read_int(c, Attribute::PowerDraw, DEFAULT_GPU_DRAW_WATTS))
        .unwrap_or(DEFAULT_GPU_DRAW_WATTS);
    cpu.saturating_add(gpu)
        .saturating_add(PLATFORM_OVERHEAD_WATTS)
}

/// Smallest PSU rating that keeps `draw` within the load limit: `ceil(draw / 0.8)`.
#[must_use]
pub fn recommended_psu_watts(draw: i64) -> i64 {
    let draw = draw.max(0);
    let scaled = draw.saturating_mul(100);
    scaled / PSU_LOAD_LIMIT_PERCENT + i64::from(scaled % PSU_LOAD_LIMIT_PERCENT != 0)
}

fn check_power_budget(selection: &Selection, resolver: Resolver<'_>, out: &mut Evaluation) {
    if selection.len() < POWER_BUDGET_MIN_POPULATED {
        return;
    }
    let Some(psu) = selection.get(CategoryId::Psu) else {
        return;
    };
    let wattage = read_int(psu, Attribute::Wattage, 0);
    if wattage <= 0 {
        return;
    }
    let draw = estimated_draw_watts(selection);
    if draw.saturating_mul(100) <= wattage.saturating_mul(PSU_LOAD_LIMIT_PERCENT) {
        return;
    }

    let limit = wattage.saturating_mul(PSU_LOAD_LIMIT_PERCENT) / 100;
    let recommended = recommended_psu_watts(draw);
    out.issue(
        RuleKind::PowerBudget,
        format!(
            "Estimated power draw of {}W exceeds {}% of the {}W power supply ({}W); \
             at least {}W is recommended",
            draw, PSU_LOAD_LIMIT_PERCENT, wattage, limit, recommended
        ),
    );
    out.suggest(resolver.suggest(
        RuleKind::PowerBudget,
        CategoryId::Psu,
        |c| read_int(c, Attribute::Wattage, 0) >= recommended,
        |c| {
            format!(
                "Switch to the {} power supply ({}W) for a {}% load margin",
                c.name,
                read_int(c, Attribute::Wattage, 0),
                PSU_LOAD_LIMIT_PERCENT
            )
        },
    ));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Price;

    fn part(id: &str, category: CategoryId) -> Component {
        Component::new(id, category, id.to_uppercase(), Price(10_000))
    }

    fn select(parts: impl IntoIterator<Item = Component>) -> Selection {
        parts.into_iter().map(|c| (c.category_id, c)).collect()
    }

    #[test]
    fn empty_selection_has_no_issues() {
        let evaluation = evaluate(&Selection::new(), &Catalog::new());
        assert!(evaluation.is_compatible());
        assert!(evaluation.suggestions.is_empty());
    }

    #[test]
    fn socket_mismatch_offers_both_directions() {
        let selection = select([
            part("cpu-am5", CategoryId::Cpu).with_spec("socket", "AM5"),
            part("mb-1700", CategoryId::Motherboard).with_spec("socket", "LGA1700"),
        ]);
        let catalog = Catalog::from_components([
            part("mb-am5", CategoryId::Motherboard).with_spec("socket", "AM5"),
            part("cpu-1700", CategoryId::Cpu).with_spec("socket", "LGA1700"),
        ]);

        let evaluation = evaluate(&selection, &catalog);
        let issues: Vec<_> = evaluation.issues_for(RuleKind::Socket).collect();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("AM5"));
        assert!(issues[0].message.contains("LGA1700"));

        let targets: Vec<_> = evaluation
            .suggestions_for(RuleKind::Socket)
            .map(|s| (s.target_category, s.resolution.component.id.as_str()))
            .collect();
        assert_eq!(
            targets,
            vec![
                (CategoryId::Motherboard, "mb-am5"),
                (CategoryId::Cpu, "cpu-1700")
            ]
        );
    }

    #[test]
    fn socket_read_through_compatibility_fallback() {
        let selection = select([
            part("cpu", CategoryId::Cpu).with_compat("socket", "AM4"),
            part("mb", CategoryId::Motherboard).with_spec("Socket", "AM4"),
        ]);
        assert!(evaluate(&selection, &Catalog::new()).is_compatible());
    }

    #[test]
    fn missing_socket_is_not_a_mismatch() {
        let selection = select([
            part("cpu", CategoryId::Cpu).with_spec("socket", "AM5"),
            part("mb", CategoryId::Motherboard),
        ]);
        assert!(evaluate(&selection, &Catalog::new()).is_compatible());
    }

    #[test]
    fn board_without_memory_type_defaults_to_ddr4() {
        let selection = select([
            part("ram", CategoryId::Ram).with_spec("type", "DDR5"),
            part("mb", CategoryId::Motherboard),
        ]);
        let catalog = Catalog::from_components([
            part("ram-d5", CategoryId::Ram).with_spec("type", "DDR5"),
            part("ram-d4", CategoryId::Ram).with_spec("type", "DDR4"),
        ]);

        let evaluation = evaluate(&selection, &catalog);
        assert_eq!(evaluation.issues_for(RuleKind::MemoryType).count(), 1);
        let suggestion = evaluation
            .suggestions_for(RuleKind::MemoryType)
            .next()
            .expect("suggestion");
        assert_eq!(suggestion.resolution.component.id.as_str(), "ram-d4");
    }

    #[test]
    fn capacity_suggestion_requires_fit_and_type() {
        let selection = select([
            part("ram-256", CategoryId::Ram)
                .with_spec("type", "DDR5")
                .with_spec("capacity", "256GB"),
            part("mb", CategoryId::Motherboard)
                .with_spec("memoryType", "DDR5")
                .with_spec("maxRam", "128GB"),
        ]);
        let catalog = Catalog::from_components([
            part("small-ddr4", CategoryId::Ram)
                .with_spec("type", "DDR4")
                .with_spec("capacity", "32GB"),
            part("big-ddr5", CategoryId::Ram)
                .with_spec("type", "DDR5")
                .with_spec("capacity", "192GB"),
            part("fit-ddr5", CategoryId::Ram)
                .with_spec("type", "DDR5")
                .with_spec("capacity", "64GB"),
        ]);

        let evaluation = evaluate(&selection, &catalog);
        assert_eq!(evaluation.issues.len(), 1);
        assert_eq!(evaluation.issues[0].rule, RuleKind::MemoryCapacity);
        let suggestion = evaluation
            .suggestions_for(RuleKind::MemoryCapacity)
            .next()
            .expect("suggestion");
        assert_eq!(suggestion.resolution.component.id.as_str(), "fit-ddr5");
    }

    #[test]
    fn capacity_ceiling_defaults_to_128() {
        let selection = select([
            part("ram", CategoryId::Ram).with_spec("capacity", "128GB"),
            part("mb", CategoryId::Motherboard),
        ]);
        assert_eq!(
            evaluate(&selection, &Catalog::new())
                .issues_for(RuleKind::MemoryCapacity)
                .count(),
            0
        );
    }

    #[test]
    fn psu_threshold_is_strict() {
        let gpu = part("gpu", CategoryId::Gpu).with_compat("minPsu", "750W");
        for (watts, expect_issue) in [(650, true), (750, false), (850, false)] {
            let selection = select([
                gpu.clone(),
                part("psu", CategoryId::Psu).with_spec("wattage", watts),
            ]);
            let issues = evaluate(&selection, &Catalog::new())
                .issues_for(RuleKind::PowerSupply)
                .count();
            assert_eq!(issues == 1, expect_issue, "psu {watts}W");
        }
    }

    #[test]
    fn undeclared_psu_requirement_is_ignored() {
        let selection = select([
            part("gpu", CategoryId::Gpu),
            part("psu", CategoryId::Psu).with_spec("wattage", 300),
        ]);
        assert_eq!(
            evaluate(&selection, &Catalog::new())
                .issues_for(RuleKind::PowerSupply)
                .count(),
            0
        );
    }

    #[test]
    fn storage_advisory_is_literal() {
        let catalog = Catalog::from_components([
            part("nvme4", CategoryId::Storage).with_spec("interface", "PCIe 4.0"),
            part("sata", CategoryId::Storage).with_spec("interface", "SATA"),
        ]);
        let fast = part("ssd", CategoryId::Storage).with_spec("interface", "PCIe 4.0");

        let legacy = select([
            fast.clone(),
            part("mb", CategoryId::Motherboard).with_spec("pciSlots", "3x PCI"),
        ]);
        let evaluation = evaluate(&legacy, &catalog);
        let issue = evaluation
            .issues_for(RuleKind::StorageInterface)
            .next()
            .expect("advisory");
        assert_eq!(issue.severity, Severity::Advisory);
        assert!(!evaluation.has_blocking_issues());
        let suggestion = evaluation
            .suggestions_for(RuleKind::StorageInterface)
            .next()
            .expect("suggestion");
        assert_eq!(suggestion.resolution.component.id.as_str(), "sata");

        let modern = select([
            fast,
            part("mb", CategoryId::Motherboard).with_spec("pciSlots", "2x PCIe 4.0 x16"),
        ]);
        assert!(evaluate(&modern, &catalog).is_compatible());

        let pcie3 = select([
            part("ssd3", CategoryId::Storage).with_spec("interface", "PCIe 3.0"),
            part("mb", CategoryId::Motherboard),
        ]);
        assert!(evaluate(&pcie3, &catalog).is_compatible());
    }

    #[test]
    fn power_budget_needs_four_categories() {
        let weak_psu = part("psu", CategoryId::Psu).with_spec("wattage", 300);
        let three = select([
            part("cpu", CategoryId::Cpu).with_spec("tdp", 170),
            part("gpu", CategoryId::Gpu).with_spec("powerDraw", 450),
            weak_psu.clone(),
        ]);
        assert_eq!(
            evaluate(&three, &Catalog::new())
                .issues_for(RuleKind::PowerBudget)
                .count(),
            0
        );

        let mut four = three;
        four.select(CategoryId::Ram, part("ram", CategoryId::Ram));
        let catalog = Catalog::from_components([
            part("psu-750", CategoryId::Psu).with_spec("wattage", 750),
            part("psu-1000", CategoryId::Psu).with_spec("wattage", 1000),
        ]);
        let evaluation = evaluate(&four, &catalog);
        let issue = evaluation
            .issues_for(RuleKind::PowerBudget)
            .next()
            .expect("power budget issue");
        // 170 + 450 + 100 = 720W; ceil(720 / 0.8) = 900W.
        assert!(issue.message.contains("720W"));
        assert!(issue.message.contains("300W"));
        assert!(issue.message.contains("80%"));
        let suggestion = evaluation
            .suggestions_for(RuleKind::PowerBudget)
            .next()
            .expect("suggestion");
        assert_eq!(suggestion.resolution.component.id.as_str(), "psu-1000");
    }

    #[test]
    fn power_budget_uses_defaults() {
        let selection = select([
            part("cpu", CategoryId::Cpu),
            part("gpu", CategoryId::Gpu),
            part("ram", CategoryId::Ram),
            part("psu", CategoryId::Psu).with_spec("wattage", "520W"),
        ]);
        // 65 + 250 + 100 = 415W; 80% of 520W is 416W.
        assert_eq!(estimated_draw_watts(&selection), 415);
        assert!(evaluate(&selection, &Catalog::new()).is_compatible());
    }

    #[test]
    fn recommended_psu_is_ceiling() {
        assert_eq!(recommended_psu_watts(720), 900);
        assert_eq!(recommended_psu_watts(415), 519);
        assert_eq!(recommended_psu_watts(0), 0);
        assert_eq!(recommended_psu_watts(-5), 0);
    }
}
