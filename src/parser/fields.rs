use std::collections::HashMap;

use super::text::normalize;

pub const REQUIRED_LABEL: &str = "Required:";
pub const TYPE_LABEL: &str = "Type:";
pub const UPDATE_LABEL: &str = "Update requires:";

/// Text runs of one block split by label, in encounter order.
///
/// `rest` holds whatever precedes the first recognized label.
#[derive(Debug, Default, PartialEq)]
pub struct LabeledFields<'a> {
    pub rest: Vec<&'a str>,
    runs: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> LabeledFields<'a> {
    /// Runs recorded under `label`. Unknown or absent labels yield an empty slice.
    pub fn get(&self, label: &str) -> &[&'a str] {
        self.runs.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All runs of `label` joined and normalized.
    pub fn value(&self, label: &str) -> String {
        normalize(&self.get(label).concat())
    }

    /// The normalized text before the first label.
    pub fn rest_value(&self) -> String {
        normalize(&self.rest.concat())
    }
}

/// Split `text` into runs delimited by any of `labels`.
///
/// Each step looks for the next occurrence of any label after the previous
/// match. The earliest position wins; at equal positions the label listed
/// first wins. A matched label's span is consumed and never rescanned.
pub fn parse_fields<'a>(text: &'a str, labels: &[&'a str]) -> LabeledFields<'a> {
    let mut fields = LabeledFields {
        rest: Vec::new(),
        runs: labels.iter().map(|l| (*l, Vec::new())).collect(),
    };

    let mut current: Option<&'a str> = None;
    let mut pos = 0;

    loop {
        let next = next_label(text, pos, labels);
        let end = next.map_or(text.len(), |(start, _)| start);
        let run = &text[pos..end];

        match current {
            Some(label) => {
                if let Some(runs) = fields.runs.get_mut(label) {
                    runs.push(run);
                }
            }
            None if !run.is_empty() => fields.rest.push(run),
            None => {}
        }

        match next {
            Some((start, label)) => {
                current = Some(label);
                pos = start + label.len();
            }
            None => break,
        }
    }

    fields
}

fn next_label<'a>(text: &str, from: usize, labels: &[&'a str]) -> Option<(usize, &'a str)> {
    let haystack = &text[from..];
    labels
        .iter()
        .filter(|l| !l.is_empty())
        .filter_map(|l| haystack.find(l).map(|i| (from + i, *l)))
        // min_by_key keeps the first of equal keys, i.e. label order breaks ties
        .min_by_key(|(i, _)| *i)
}
