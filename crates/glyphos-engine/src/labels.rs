//! Label vocabulary
//!
//! Labels are plain dotted strings; a few reserved prefixes carry engine
//! semantics. `"_split.<method>"` asks for decomposition, `"_group.<suffix>"`
//! requests a manual merge, `"_group._part.<label>"` marks a glyph consumed
//! by a group, and `"_error"` is the sentinel left after demotion exhausts
//! every hypothesis.

/// Prefix of labels that request a split, followed by the strategy name
pub const SPLIT_PREFIX: &str = "_split.";

/// Prefix of manual grouping labels
pub const GROUP_PREFIX: &str = "_group";

/// Prefix of the "consumed by group" sentinel
pub const GROUP_PART_PREFIX: &str = "_group._part.";

/// Sentinel label assigned when demotion runs out of hypotheses
pub const ERROR_LABEL: &str = "_error";

/// Labels with this prefix veto group candidates during evaluation
pub const SKIP_PREFIX: &str = "skip";

/// Extracts the strategy name from a `"_split.<method>"` label
pub fn split_method(label: &str) -> Option<&str> {
    label.strip_prefix(SPLIT_PREFIX).filter(|m| !m.is_empty())
}

/// Returns true for labels beginning with `"_group"`
pub fn is_group_label(label: &str) -> bool {
    label.starts_with(GROUP_PREFIX)
}

/// Extracts the suffix from a `"_group.<suffix>"` label
pub fn group_suffix(label: &str) -> Option<&str> {
    label
        .strip_prefix(GROUP_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .filter(|s| !s.is_empty())
}

/// Builds the "consumed by group" sentinel carrying the group's resolved
/// label
pub fn group_part_label(resolved: &str) -> String {
    format!("{GROUP_PART_PREFIX}{resolved}")
}

/// Returns true for the "consumed by group" sentinel
pub fn is_group_part(label: &str) -> bool {
    label.starts_with(GROUP_PART_PREFIX)
}

/// Returns true for labels that veto a candidate group: anything beginning
/// with `"_split"` or `"skip"`
pub fn is_group_veto(label: &str) -> bool {
    label.starts_with("_split") || label.starts_with(SKIP_PREFIX)
}

/// Returns true for glyphs the grouping engine must leave alone: split
/// results (`"split..."`) and unexpanded split guesses (`"_split..."`)
pub fn is_split_resolved(label: &str) -> bool {
    label.starts_with("split") || label.starts_with(SPLIT_PREFIX)
}
