//! C5: longest-common-prefix autocompletion over the binding table.

use crate::binding::BindingTable;

/// Result of computing autocompletion candidates for a prefix.
pub struct AutocompleteResult {
    pub first_candidate: Option<&'static str>,
    pub autocompleted_len: u16,
    pub candidate_count: u16,
}

impl AutocompleteResult {
    const NONE: Self = Self {
        first_candidate: None,
        autocompleted_len: 0,
        candidate_count: 0,
    };
}

/// Computes the longest common prefix over every binding whose name starts
/// with `prefix`, marking each match as a candidate in the table's transient
/// scratch array. An empty prefix yields no candidates (nothing to offer).
pub fn compute<H: Copy, const CAP: usize>(
    table: &mut BindingTable<H, CAP>,
    prefix: &str,
) -> AutocompleteResult {
    table.clear_candidate_flags();

    if prefix.is_empty() {
        return AutocompleteResult::NONE;
    }

    let mut autocompleted_len: u16 = 0;
    let mut first_candidate: Option<&'static str> = None;
    let mut count: u16 = 0;

    for (index, binding) in table.iter().enumerate() {
        let name = binding.name;
        if name.len() < prefix.len() || &name[..prefix.len()] != prefix {
            continue;
        }
        table.mark_candidate(index);

        if count == 0 || (name.len() as u16) < autocompleted_len {
            autocompleted_len = name.len() as u16;
        }

        if count == 0 {
            first_candidate = Some(name);
        } else {
            let first = first_candidate.unwrap();
            let common = common_prefix_len(first, name, prefix.len());
            if common < autocompleted_len {
                autocompleted_len = common;
            }
        }
        count += 1;
    }

    AutocompleteResult {
        first_candidate,
        autocompleted_len,
        candidate_count: count,
    }
}

/// Length of the common prefix of `a` and `b`, starting comparison at byte
/// index `from` (the caller already knows both share that much).
fn common_prefix_len(a: &str, b: &str, from: usize) -> u16 {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut i = from;
    let max = a.len().min(b.len());
    while i < max && a[i] == b[i] {
        i += 1;
    }
    i as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Binding;

    fn noop(_h: (), _a: Option<&str>, _c: *mut ()) -> u8 {
        0
    }

    fn table_with(names: &[&'static str]) -> BindingTable<(), 8> {
        let mut table = BindingTable::new();
        for name in names {
            table.add(Binding {
                name,
                help: None,
                tokenize_args: false,
                context: core::ptr::null_mut(),
                handler: noop,
            });
        }
        table
    }

    #[test]
    fn unique_prefix_yields_single_candidate() {
        let mut table = table_with(&["get-led", "get-adc", "set"]);
        let result = compute(&mut table, "set");
        assert_eq!(result.candidate_count, 1);
        assert_eq!(result.autocompleted_len, 3);
        assert_eq!(result.first_candidate, Some("set"));
    }

    #[test]
    fn ambiguous_prefix_yields_longest_common_prefix() {
        let mut table = table_with(&["get-led", "get-adc", "set"]);
        let result = compute(&mut table, "g");
        assert_eq!(result.candidate_count, 2);
        assert_eq!(result.autocompleted_len, 4); // "get-"
    }

    #[test]
    fn empty_prefix_offers_nothing() {
        let mut table = table_with(&["a", "b"]);
        let result = compute(&mut table, "");
        assert_eq!(result.candidate_count, 0);
    }

    #[test]
    fn no_match_yields_empty_result() {
        let mut table = table_with(&["alpha", "beta"]);
        let result = compute(&mut table, "z");
        assert_eq!(result.candidate_count, 0);
        assert_eq!(result.first_candidate, None);
    }

    #[test]
    fn first_candidate_is_first_in_insertion_order() {
        let mut table = table_with(&["get-led", "get-adc"]);
        let result = compute(&mut table, "get-");
        assert_eq!(result.first_candidate, Some("get-led"));
    }

    #[test]
    fn candidate_flags_mark_only_matches() {
        let mut table = table_with(&["get-led", "get-adc", "set"]);
        compute(&mut table, "get-");
        assert!(table.is_candidate(0));
        assert!(table.is_candidate(1));
        assert!(!table.is_candidate(2));
    }
}
