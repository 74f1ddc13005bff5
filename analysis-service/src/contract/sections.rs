//! UI section synthesis from the action-oriented fields.

use serde_json::Value;

use super::coerce::{self, ensure_min_items, string_list};
use super::result::{ActionsToday, RedFlag, Section};
use super::template::{
    DEFAULT_CARE, DEFAULT_DIET, DEFAULT_HYDRATION, DEFAULT_OBSERVE, Template, WARNING_FILLER,
};

/// Normalize the candidate's section list, floor-pad it to four entries and
/// each entry's items to three, then repair the degenerate all-identical
/// outcome by rebuilding the five canonical sections.
pub fn synthesize(
    candidate_sections: Option<&Value>,
    template: &Template,
    actions: &ActionsToday,
    red_flags: &[RedFlag],
) -> Vec<Section> {
    let normalized: Vec<Section> = match candidate_sections {
        Some(Value::Array(items)) => items
            .iter()
            .map(|sec| {
                let map = coerce::object(Some(sec));
                Section {
                    title: coerce::string_or(map.get("title"), ""),
                    icon_key: coerce::string_or(map.get("icon_key"), "info"),
                    items: string_list(map.get("items")),
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let canonical = &template.ui_sections;
    let filler = actions.all_items();
    let sections: Vec<Section> = ensure_min_items(normalized, 4, canonical)
        .into_iter()
        .enumerate()
        .map(|(idx, sec)| {
            let fallback = &canonical[idx % canonical.len()];
            Section {
                title: if sec.title.is_empty() {
                    fallback.title.clone()
                } else {
                    sec.title
                },
                icon_key: if sec.icon_key.is_empty() {
                    fallback.icon_key.clone()
                } else {
                    sec.icon_key
                },
                items: ensure_min_items(sec.items, 3, &filler),
            }
        })
        .collect();

    if is_degenerate(&sections) {
        rebuild_canonical(actions, red_flags)
    } else {
        sections
    }
}

/// A collapsed upstream section list pads every tab with the same filler;
/// when all item lists come out pairwise identical the synthesis is useless
/// to the UI.
fn is_degenerate(sections: &[Section]) -> bool {
    match sections.first() {
        Some(first) => sections.iter().all(|sec| sec.items == first.items),
        None => true,
    }
}

/// Five canonical sections sourced directly from the advice categories and
/// red flags. This compensates for a suspected upstream failure mode
/// (duplicated section content); revisit if the upstream format changes.
fn rebuild_canonical(actions: &ActionsToday, red_flags: &[RedFlag]) -> Vec<Section> {
    let warning_items: Vec<String> = red_flags
        .iter()
        .map(|f| {
            if f.title.is_empty() {
                f.detail.clone()
            } else {
                f.title.clone()
            }
        })
        .collect();

    vec![
        Section {
            title: "饮食".into(),
            icon_key: "diet".into(),
            items: ensure_min_items(actions.diet.clone(), 3, &DEFAULT_DIET),
        },
        Section {
            title: "补液".into(),
            icon_key: "hydration".into(),
            items: ensure_min_items(actions.hydration.clone(), 3, &DEFAULT_HYDRATION),
        },
        Section {
            title: "护理".into(),
            icon_key: "care".into(),
            items: ensure_min_items(actions.care.clone(), 3, &DEFAULT_CARE),
        },
        Section {
            title: "警戒信号".into(),
            icon_key: "warning".into(),
            items: ensure_min_items(warning_items, 3, &WARNING_FILLER),
        },
        Section {
            title: "观察指标".into(),
            icon_key: "observe".into(),
            items: ensure_min_items(actions.observe.clone(), 3, &DEFAULT_OBSERVE),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::template;
    use serde_json::json;

    fn sample_actions() -> ActionsToday {
        ActionsToday {
            diet: vec!["d1".into(), "d2".into(), "d3".into()],
            hydration: vec!["h1".into(), "h2".into(), "h3".into()],
            care: vec!["c1".into(), "c2".into(), "c3".into()],
            avoid: vec!["a1".into(), "a2".into(), "a3".into()],
            observe: vec!["o1".into(), "o2".into(), "o3".into()],
        }
    }

    #[test]
    fn distinct_candidate_sections_survive() {
        let tpl = template::canonical();
        let sections = synthesize(
            Some(&json!([
                {"title": "一", "icon_key": "diet", "items": ["x", "y", "z"]},
                {"title": "二", "icon_key": "care", "items": ["p", "q", "r"]},
                {"title": "三", "items": ["1", "2", "3"]},
                {"title": "四", "items": ["4", "5", "6"]}
            ])),
            &tpl,
            &sample_actions(),
            &[],
        );
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0].title, "一");
        assert_eq!(sections[2].icon_key, "info");
        assert_eq!(sections[1].items, vec!["p", "q", "r"]);
    }

    #[test]
    fn missing_sections_collapse_to_canonical_rebuild() {
        // Four padded sections all get the same filler, which trips the
        // degeneracy check and rebuilds the five canonical tabs.
        let tpl = template::canonical();
        let sections = synthesize(None, &tpl, &sample_actions(), &[]);
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[0].title, "饮食");
        assert_eq!(sections[3].icon_key, "warning");
        assert_eq!(sections[4].items, vec!["o1", "o2", "o3"]);
    }

    #[test]
    fn identical_supplied_sections_are_rebuilt() {
        let tpl = template::canonical();
        let dup = json!({"title": "同", "icon_key": "info", "items": ["s", "s", "s"]});
        let flags = vec![
            RedFlag {
                title: "便血".into(),
                detail: "就医".into(),
            },
        ];
        let sections = synthesize(
            Some(&json!([dup.clone(), dup.clone(), dup.clone(), dup])),
            &tpl,
            &sample_actions(),
            &flags,
        );
        assert_eq!(sections.len(), 5);
        assert_eq!(sections[3].items[0], "便血");
        assert_eq!(sections[3].items.len(), 3);
    }
}
