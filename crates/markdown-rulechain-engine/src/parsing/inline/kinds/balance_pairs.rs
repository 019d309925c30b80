use std::collections::HashMap;

use crate::error::Result;
use crate::parsing::inline::{Delimiter, StateInline};

/// Pairs openers with closers in one delimiter list, setting `end` on each
/// matched opener.
///
/// Failed searches record a lower bound per marker, closer length mod 3 and
/// closer `open` flag, and matched ranges record jumps, so inputs like
/// `*_*_*_...` stay linear.
fn process_delimiters(delimiters: &mut [Delimiter]) {
    let max = delimiters.len();
    if max == 0 {
        return;
    }

    let mut openers_bottom: HashMap<u8, [isize; 6]> = HashMap::new();
    // first delimiter of the run the current closer belongs to
    let mut header_idx = 0;
    let mut last_token_idx: isize = -2;
    let mut jumps: Vec<usize> = Vec::with_capacity(max);

    for closer_idx in 0..max {
        jumps.push(0);

        let closer_marker = delimiters[closer_idx].marker;
        let closer_token = delimiters[closer_idx].token as isize;

        // same marker and adjacent tokens: same run
        if delimiters[header_idx].marker != closer_marker || last_token_idx != closer_token - 1 {
            header_idx = closer_idx;
        }
        last_token_idx = closer_token;

        if !delimiters[closer_idx].close {
            continue;
        }

        let closer_length = delimiters[closer_idx].length;
        let bottom_slot = usize::from(delimiters[closer_idx].open) * 3 + closer_length % 3;
        let min_opener_idx = openers_bottom.entry(closer_marker).or_insert([-1; 6])[bottom_slot];

        let mut opener_idx = header_idx as isize - jumps[header_idx] as isize - 1;
        let mut new_min_opener_idx = opener_idx;

        while opener_idx > min_opener_idx {
            let oi = opener_idx as usize;
            let opener = &delimiters[oi];

            if opener.marker == closer_marker && opener.open && opener.end.is_none() {
                let closer = &delimiters[closer_idx];
                // a run that can both open and close may not pair to a
                // length that is a multiple of 3, unless both are
                let is_odd_match = (opener.close || closer.open)
                    && (opener.length + closer.length) % 3 == 0
                    && (opener.length % 3 != 0 || closer.length % 3 != 0);

                if !is_odd_match {
                    // a non-opener right before lets later searches skip it too
                    let last_jump = if oi > 0 && !delimiters[oi - 1].open {
                        jumps[oi - 1] + 1
                    } else {
                        0
                    };

                    jumps[closer_idx] = closer_idx - oi + last_jump;
                    jumps[oi] = last_jump;

                    delimiters[closer_idx].open = false;
                    delimiters[oi].end = Some(closer_idx);
                    delimiters[oi].close = false;
                    new_min_opener_idx = -1;
                    // next token starts a new run
                    last_token_idx = -2;
                    break;
                }
            }

            opener_idx -= jumps[oi] as isize + 1;
        }

        if new_min_opener_idx != -1 {
            let slot = usize::from(delimiters[closer_idx].open) * 3 + closer_length % 3;
            if let Some(bottom) = openers_bottom.get_mut(&closer_marker) {
                bottom[slot] = new_min_opener_idx;
            }
        }
    }
}

pub fn balance_pairs(state: &mut StateInline<'_>) -> Result<()> {
    for id in state.delimiter_list_ids() {
        process_delimiters(&mut state.delimiter_lists[id]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn delim(token: usize, length: usize, open: bool, close: bool) -> Delimiter {
        Delimiter {
            marker: b'*',
            length,
            token,
            end: None,
            open,
            close,
        }
    }

    #[test]
    fn pairs_nearest_opener() {
        let mut list = vec![delim(0, 1, true, false), delim(2, 1, true, false), delim(4, 1, false, true)];
        process_delimiters(&mut list);
        assert_eq!(list[0].end, None);
        assert_eq!(list[1].end, Some(2));
    }

    #[test]
    fn multiple_of_three_rule_blocks_match() {
        // "*a**": opener length 1, closer run length 2 that can also open
        let mut list = vec![
            delim(0, 1, true, false),
            delim(2, 2, true, true),
            delim(3, 2, true, true),
        ];
        process_delimiters(&mut list);
        assert!(list.iter().all(|d| d.end.is_none()));
    }

    #[test]
    fn pathological_input_stays_fast() {
        let src = "*_".repeat(20_000);
        let html = crate::Markdown::new().render_inline(&src).unwrap();
        assert!(html.contains("<em>"));
    }
}
