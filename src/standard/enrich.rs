use std::collections::HashSet;

use crate::text::first_sentence;

use super::segment::{PartKind, SegmentPart};

/// ESRS sub-points: every leaf item is prefixed with its parents' lead
/// sentences so it reads on its own. Parents with children are not emitted.
pub(crate) fn enrich_esrs(parts: &[SegmentPart]) -> Vec<String> {
    let items = parts
        .iter()
        .filter(|part| part.kind != PartKind::Overview)
        .collect::<Vec<&SegmentPart>>();

    let mut sub_points = Vec::new();
    let mut index = 0;
    while index < items.len() {
        let item = items[index];
        let (parent, children_start) = if item.kind == PartKind::Numeric {
            (Some(item), index + 1)
        } else {
            (None, index)
        };

        let children_end = items[children_start..]
            .iter()
            .position(|part| part.kind == PartKind::Numeric)
            .map_or(items.len(), |offset| children_start + offset);
        let children = &items[children_start..children_end];

        match parent {
            Some(parent) if children.is_empty() => {
                push_labelled(&mut sub_points, &parent.label, &[parent.text.as_str()]);
            }
            _ => emit_esrs_children(&mut sub_points, parent, children),
        }

        index = children_end;
    }

    sub_points
}

fn emit_esrs_children(
    sub_points: &mut Vec<String>,
    parent: Option<&SegmentPart>,
    children: &[&SegmentPart],
) {
    let prefix = parent.map_or("", |part| part.label.as_str());
    let parent_sentence = parent.map_or("", |part| first_sentence(&part.text));
    let mut seen = HashSet::new();

    let mut index = 0;
    while index < children.len() {
        let child = children[index];
        let romans: &[&SegmentPart] = if child.kind == PartKind::Letter {
            following_romans(&children[index + 1..])
        } else {
            &[]
        };

        if romans.is_empty() {
            let label = format!("{prefix}({})", child.label);
            if seen.insert(label.clone()) {
                push_labelled(sub_points, &label, &[parent_sentence, child.text.as_str()]);
            }
        } else {
            let letter_sentence = first_sentence(&child.text);
            for roman in romans {
                let label = format!("{prefix}({})({})", child.label, roman.label);
                if seen.insert(label.clone()) {
                    push_labelled(
                        sub_points,
                        &label,
                        &[parent_sentence, letter_sentence, roman.text.as_str()],
                    );
                }
            }
        }

        index += 1 + romans.len();
    }
}

/// GRI sub-points keep only the first sentence of each item. Letters with
/// roman children are replaced by one combined entry per roman.
pub(crate) fn enrich_gri(parts: &[SegmentPart]) -> Vec<String> {
    let items = parts
        .iter()
        .filter(|part| matches!(part.kind, PartKind::Letter | PartKind::Roman))
        .collect::<Vec<&SegmentPart>>();

    let mut sub_points = Vec::new();
    let mut seen = HashSet::new();
    let mut index = 0;
    while index < items.len() {
        let item = items[index];
        let romans: &[&SegmentPart] = if item.kind == PartKind::Letter {
            following_romans(&items[index + 1..])
        } else {
            &[]
        };

        if romans.is_empty() {
            if seen.insert(item.label.clone()) {
                push_labelled(&mut sub_points, &item.label, &[first_sentence(&item.text)]);
            }
        } else {
            let letter_sentence = first_sentence(&item.text).trim_end_matches('.');
            for roman in romans {
                let label = format!("{}-{}", item.label, roman.label);
                if seen.insert(label.clone()) {
                    push_labelled(
                        &mut sub_points,
                        &label,
                        &[letter_sentence, first_sentence(&roman.text)],
                    );
                }
            }
        }

        index += 1 + romans.len();
    }

    sub_points
}

fn following_romans<'p, 'a>(parts: &'p [&'a SegmentPart]) -> &'p [&'a SegmentPart] {
    let end = parts
        .iter()
        .position(|part| part.kind != PartKind::Roman)
        .unwrap_or(parts.len());
    &parts[..end]
}

/// Pushes `"{label}. {context...} {own text}"`. Items without text of
/// their own are skipped.
fn push_labelled(sub_points: &mut Vec<String>, label: &str, pieces: &[&str]) {
    let Some((own_text, context)) = pieces.split_last() else {
        return;
    };
    if own_text.trim().is_empty() {
        return;
    }

    let body = context
        .iter()
        .chain(std::iter::once(own_text))
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");

    sub_points.push(format!("{label}. {body}"));
}
