//! Forward-migration of the older minimal result shape.
//!
//! Early upstream builds returned only flat fields (`bristol_type`, `color`,
//! `texture`, `diet_advice`, `hydration_hint`, `summary`). This fills in the
//! composites the current schema expects without discarding anything the
//! candidate already carries; the output is then normalized like any other
//! candidate.

use serde_json::{Map, Value, json};

use super::coerce;

/// Fields whose presence marks the current shape; a candidate missing one
/// gets it synthesized from the flat legacy fields plus defaults.
pub fn upgrade(candidate: Value) -> Value {
    let mut map = match candidate {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    map.insert("ok".into(), Value::Bool(coerce::bool_or_true(map.get("ok"))));

    if is_absent(map.get("headline")) {
        let headline = coerce::trimmed(map.get("summary")).unwrap_or_default();
        map.insert("headline".into(), Value::String(headline));
    }
    if is_absent(map.get("score")) {
        map.insert("score".into(), json!(50));
    }
    if is_absent(map.get("risk_level")) {
        map.insert("risk_level".into(), json!("low"));
    }
    if is_absent(map.get("confidence")) {
        map.insert("confidence".into(), json!(0.6));
    }
    if is_absent(map.get("uncertainty_note")) {
        map.insert("uncertainty_note".into(), json!(""));
    }

    if is_absent(map.get("stool_features")) {
        let color = coerce::trimmed(map.get("color"));
        let texture = coerce::trimmed(map.get("texture"));
        let features = json!({
            "bristol_type": map.get("bristol_type").cloned().unwrap_or(Value::Null),
            "bristol_range": "unknown",
            "shape": "偏软/糊状",
            "shape_desc": "未知形态",
            "color": color.clone().unwrap_or_else(|| "黄褐/偏黄".into()),
            "color_desc": color.unwrap_or_else(|| "未知颜色".into()),
            "color_reason": "多与饮食构成和肠道通过速度相关",
            "texture": texture.clone().unwrap_or_else(|| "细腻/糊状".into()),
            "texture_desc": texture.unwrap_or_else(|| "未知质地".into()),
            "abnormal_signs": ["未见明显异常"],
            "volume": "unknown",
            "wateriness": "none",
            "mucus": "none",
            "foam": "none",
            "blood": "none",
            "undigested_food": "none",
            "separation_layers": "none",
            "odor_level": "unknown",
            "visible_findings": ["none"],
        });
        map.insert("stool_features".into(), features);
    }

    if is_absent(map.get("interpretation")) {
        map.insert(
            "interpretation".into(),
            json!({
                "overall_judgement": "需结合更多信息判断",
                "why_shape": ["图片角度可能影响判断", "仅凭单张图片信息有限"],
                "why_color": ["颜色受光线影响", "需结合饮食判断"],
                "why_texture": ["质地受含水量影响", "需结合排便情况判断"],
                "how_context_affects": [
                    "未提供补充信息",
                    "若精神食欲良好更偏功能性",
                    "若有发热腹痛需警惕"
                ],
                "confidence_explain": "缺少完整补充信息，置信度有限。",
            }),
        );
    }

    if is_absent(map.get("doctor_explanation")) {
        let conclusion = coerce::trimmed(map.get("headline")).unwrap_or_default();
        let judgement = map
            .get("interpretation")
            .and_then(|v| coerce::trimmed(v.get("overall_judgement")))
            .unwrap_or_default();
        map.insert(
            "doctor_explanation".into(),
            json!({
                "one_sentence_conclusion": conclusion,
                "shape": "形态偏软并不一定异常",
                "color": "颜色多与饮食和通过速度相关",
                "texture": "未见感染性腹泻的典型表现",
                "visual_analysis": {
                    "shape": "形态偏软并不一定异常",
                    "color": "颜色多与饮食和通过速度相关",
                    "texture": "未见感染性腹泻的典型表现",
                },
                "combined_judgement": judgement,
            }),
        );
    }

    if is_absent(map.get("possible_causes")) {
        map.insert(
            "possible_causes".into(),
            json!([
                {"title": "饮食结构影响", "explanation": "水果或含水量高的食物增加会让便便偏软。"},
                {"title": "肠道蠕动偏快", "explanation": "幼儿阶段肠道功能调试期，容易偏软。"},
                {"title": "轻微受凉或作息变化", "explanation": "环境变化可短暂影响消化节律。"}
            ]),
        );
    }
    if is_absent(map.get("reasoning_bullets")) {
        map.insert("reasoning_bullets".into(), json!([]));
    }

    if is_absent(map.get("actions_today")) {
        let diet = match map.get("diet_advice") {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            _ => json!([]),
        };
        let hydration = match coerce::trimmed(map.get("hydration_hint")) {
            Some(hint) => json!([hint]),
            None => json!([]),
        };
        let care = match map.get("care_advice") {
            Some(Value::Array(items)) => Value::Array(items.clone()),
            _ => json!([]),
        };
        map.insert(
            "actions_today".into(),
            json!({
                "diet": diet,
                "hydration": hydration,
                "care": care,
                "avoid": [],
                "observe": [],
            }),
        );
    }

    if is_absent(map.get("red_flags")) {
        map.insert("red_flags".into(), json!([]));
    }
    if is_absent(map.get("follow_up_questions")) {
        map.insert("follow_up_questions".into(), json!([]));
    }

    if is_absent(map.get("ui_strings")) {
        let summary = coerce::trimmed(map.get("summary")).unwrap_or_default();
        map.insert(
            "ui_strings".into(),
            json!({"summary": summary, "tags": [], "sections": []}),
        );
    }
    if let Some(Value::Object(ui)) = map.get_mut("ui_strings") {
        if is_absent(ui.get("longform")) {
            ui.insert(
                "longform".into(),
                json!({
                    "conclusion": "",
                    "how_to_read": "",
                    "context": "",
                    "causes": "",
                    "todo": "",
                    "red_flags": "",
                    "reassure": "",
                }),
            );
        }
    }

    Value::Object(map)
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn synthesizes_composites_from_flat_fields() {
        let upgraded = upgrade(json!({
            "ok": true,
            "summary": "偏软，建议观察",
            "bristol_type": 5,
            "color": "黄绿",
            "texture": "稀糊",
            "diet_advice": ["清淡饮食"],
            "hydration_hint": "多喝水",
        }));

        assert_eq!(upgraded["headline"], "偏软，建议观察");
        assert_eq!(upgraded["stool_features"]["bristol_type"], 5);
        assert_eq!(upgraded["stool_features"]["color"], "黄绿");
        assert_eq!(upgraded["stool_features"]["texture_desc"], "稀糊");
        assert_eq!(upgraded["actions_today"]["diet"][0], "清淡饮食");
        assert_eq!(upgraded["actions_today"]["hydration"][0], "多喝水");
        assert_eq!(upgraded["ui_strings"]["summary"], "偏软，建议观察");
        assert!(upgraded["ui_strings"]["longform"].is_object());
    }

    #[test]
    fn keeps_existing_composites_untouched() {
        let upgraded = upgrade(json!({
            "stool_features": {"shape": "成形"},
            "interpretation": {"overall_judgement": "正常"},
        }));
        assert_eq!(upgraded["stool_features"]["shape"], "成形");
        assert_eq!(upgraded["interpretation"]["overall_judgement"], "正常");
        // No extra keys injected into supplied composites.
        assert!(upgraded["stool_features"].get("color").is_none());
    }

    #[test]
    fn non_object_input_becomes_a_minimal_candidate() {
        let upgraded = upgrade(json!("garbage"));
        assert_eq!(upgraded["ok"], true);
        assert!(upgraded["stool_features"].is_object());
    }
}
