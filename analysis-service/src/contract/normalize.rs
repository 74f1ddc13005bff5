//! The schema normalizer: merges an untrusted candidate against the
//! canonical template and emits a fully-populated [`NormalizedResult`].
//!
//! This is a total function over any JSON value. Wrong types, missing
//! fields, out-of-domain enum values, and under-populated lists are all
//! repaired by substitution; nothing here returns an error.

use serde_json::{Map, Value};

use super::SCHEMA_VERSION;
use super::coerce::{self, ensure_min_items, string_list};
use super::context::ContextInput;
use super::result::{
    ActionsToday, AnalysisBasis, Cause, DoctorExplanation, ImageValidation, InputEcho,
    Interpretation, Longform, NormalizedResult, Outcome, RedFlag, RetakeReport, RiskLevel,
    Section, StoolFeatures, StoolReport, UiStrings, VisualAnalysis,
};
use super::sections;
use super::template::{self, Template};

/// Request-scoped metadata resolved by the transport layer.
#[derive(Debug, Clone, Default)]
pub struct NormalizeMeta {
    pub worker_version: String,
    pub proxy_version: Option<String>,
    pub model_used: Option<String>,
}

/// Normalize a candidate of unknown shape into the current contract.
pub fn normalize(
    candidate: &Value,
    meta: &NormalizeMeta,
    context: &ContextInput,
) -> NormalizedResult {
    let map = match candidate {
        Value::Object(m) => m.clone(),
        _ => Map::new(),
    };
    let tpl = template::canonical();

    let ok = coerce::bool_or_true(map.get("ok"));
    let is_stool = coerce::bool_or_true(map.get("is_stool_image"));

    let mut headline = coerce::string_or(map.get("headline"), "");
    let explanation = coerce::string_or(map.get("explanation"), "");
    let score = coerce::finite_f64(map.get("score"), tpl.score);
    let confidence = coerce::finite_f64(map.get("confidence"), tpl.confidence);
    // A not-ok or not-stool result carries no risk judgement.
    let risk_level = if !ok || !is_stool {
        RiskLevel::Unknown
    } else {
        coerce::enum_field(map.get("risk_level"))
    };
    let mut uncertainty_note = coerce::string_or(map.get("uncertainty_note"), "");

    let basis = coerce::object(map.get("analysis_basis"));
    let analysis_basis = AnalysisBasis {
        image_only: ensure_min_items(
            string_list(basis.get("image_only")),
            4,
            &template::DEFAULT_IMAGE_ONLY,
        ),
        combined_reasoning: ensure_min_items(
            string_list(basis.get("combined_reasoning")),
            5,
            &template::DEFAULT_COMBINED_REASONING,
        ),
    };

    let mut image_validation = coerce_image_validation(map.get("image_validation"));
    let derived_summary = context.summary();
    let fragments = context.fragments();

    let raw_context_summary = match map.get("context_summary") {
        None => tpl.context_summary.clone(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => String::new(),
    };

    let (outcome, context_summary) = if is_stool {
        if headline.is_empty() {
            headline = if ok {
                "整体风险偏低，建议继续观察"
            } else {
                "分析不确定，建议补充信息"
            }
            .to_string();
        }
        if uncertainty_note.is_empty() && !ok {
            uncertainty_note = "图片信息不足，建议补充说明或更清晰图片。".into();
        }
        // Context supplied by the caller beats both the candidate's
        // placeholder sentence and the template's.
        let cs = if !derived_summary.is_empty()
            && (raw_context_summary.is_empty() || raw_context_summary.contains("未提供补充信息"))
        {
            derived_summary
        } else {
            raw_context_summary
        };
        let report = stool_report(&map, &tpl, &headline, &fragments);
        (Outcome::Stool(report), cs)
    } else {
        let cs = if context.is_empty() {
            "本次仅用于确认是否为大便图片。".to_string()
        } else {
            derived_summary
        };
        if image_validation.is_none() {
            image_validation = Some(ImageValidation {
                status: "not_stool".into(),
                reason: if explanation.is_empty() {
                    "未识别到大便图像。".into()
                } else {
                    explanation.clone()
                },
                tips: vec![
                    "对焦清晰".into(),
                    "光线充足".into(),
                    "目标占画面 50% 以上".into(),
                ],
            });
        }
        (Outcome::NotStool(retake_report(&headline, &fragments)), cs)
    };

    NormalizedResult {
        ok,
        schema_version: SCHEMA_VERSION,
        worker_version: coerce::trimmed(map.get("worker_version"))
            .unwrap_or_else(|| meta.worker_version.clone()),
        proxy_version: meta
            .proxy_version
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| coerce::trimmed(map.get("proxy_version")))
            .unwrap_or_else(|| "unknown".into()),
        model_used: meta
            .model_used
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| coerce::trimmed(map.get("model_used")))
            .unwrap_or_else(|| "unknown".into()),
        model_primary: coerce::string_or(map.get("model_primary"), ""),
        model_fallback: coerce::string_or(map.get("model_fallback"), ""),
        used_fallback: coerce::bool_or_false(map.get("used_fallback")),
        primary_error: coerce::string_or(map.get("primary_error"), ""),
        error_code: coerce::trimmed(map.get("error_code")),
        error: coerce::trimmed(map.get("error")),
        message: coerce::trimmed(map.get("message")),
        headline,
        score,
        risk_level,
        confidence,
        uncertainty_note,
        explanation,
        context_summary,
        analysis_basis,
        input_echo: InputEcho {
            context: context.echo(),
        },
        image_validation,
        outcome,
    }
}

fn stool_report(
    map: &Map<String, Value>,
    tpl: &Template,
    headline: &str,
    fragments: &[String],
) -> StoolReport {
    let features = stool_features(&coerce::object(map.get("stool_features")), &tpl.stool_features);

    let interp = coerce::object(map.get("interpretation"));
    let how_context_affects = if fragments.is_empty() {
        ensure_min_items(
            string_list(interp.get("how_context_affects")),
            3,
            &tpl.interpretation.how_context_affects,
        )
    } else {
        // Caller context replaces generic placeholders outright; the
        // fragments also serve as their own padding rotation.
        ensure_min_items(fragments.to_vec(), 3, fragments)
    };
    let interpretation = Interpretation {
        overall_judgement: coerce::string_or(
            interp.get("overall_judgement"),
            &tpl.interpretation.overall_judgement,
        ),
        why_shape: ensure_min_items(
            string_list(interp.get("why_shape")),
            2,
            &tpl.interpretation.why_shape,
        ),
        why_color: ensure_min_items(
            string_list(interp.get("why_color")),
            2,
            &tpl.interpretation.why_color,
        ),
        why_texture: ensure_min_items(
            string_list(interp.get("why_texture")),
            2,
            &tpl.interpretation.why_texture,
        ),
        how_context_affects,
        confidence_explain: coerce::string_or(
            interp.get("confidence_explain"),
            &tpl.interpretation.confidence_explain,
        ),
    };

    let doctor_explanation = doctor(
        &coerce::object(map.get("doctor_explanation")),
        tpl,
        headline,
        &interpretation,
    );

    let possible_causes = causes(map.get("possible_causes"));

    let reasoning_bullets = ensure_min_items(
        string_list(map.get("reasoning_bullets")),
        5,
        &template::DEFAULT_REASONING,
    );

    let actions = coerce::object(map.get("actions_today"));
    let actions_today = ActionsToday {
        diet: ensure_min_items(string_list(actions.get("diet")), 3, &template::DEFAULT_DIET),
        hydration: ensure_min_items(
            string_list(actions.get("hydration")),
            3,
            &template::DEFAULT_HYDRATION,
        ),
        care: ensure_min_items(string_list(actions.get("care")), 3, &template::DEFAULT_CARE),
        avoid: ensure_min_items(
            string_list(actions.get("avoid")),
            3,
            &template::DEFAULT_AVOID,
        ),
        observe: ensure_min_items(
            string_list(actions.get("observe")),
            3,
            &template::DEFAULT_OBSERVE,
        ),
    };

    let red_flags = coerce::red_flags(map.get("red_flags"), 5);
    let follow_up_questions = ensure_min_items(
        string_list(map.get("follow_up_questions")),
        6,
        &template::DEFAULT_FOLLOW_UPS,
    );

    let ui = coerce::object(map.get("ui_strings"));
    let sections = sections::synthesize(ui.get("sections"), tpl, &actions_today, &red_flags);
    let tags = ensure_min_items(string_list(ui.get("tags")), 1, &["需观察".to_string()]);

    // Summary precedence: nested ui summary, then the legacy flat field,
    // then a headline+bullets digest. The flat field mirrors the nested one
    // afterwards so the pair stays consistent (and re-normalization stable).
    let summary = coerce::trimmed(ui.get("summary"))
        .or_else(|| coerce::trimmed(map.get("summary")))
        .unwrap_or_else(|| {
            let mut parts = vec![headline.to_string()];
            parts.extend(reasoning_bullets.iter().take(2).cloned());
            parts.retain(|p| !p.is_empty());
            parts.join("，")
        });

    let longform = longform(
        &coerce::object(ui.get("longform")),
        headline,
        &features,
        &interpretation,
        &reasoning_bullets,
        &actions_today,
        &red_flags,
    );

    let ui_strings = UiStrings {
        summary: summary.clone(),
        tags,
        sections,
        longform,
    };

    StoolReport {
        is_stool_image: true,
        bristol_type: features.bristol_type,
        color: Some(features.color_desc.clone()),
        texture: Some(features.texture_desc.clone()),
        hydration_hint: actions_today.hydration.first().cloned().unwrap_or_default(),
        diet_advice: actions_today.diet.clone(),
        stool_features: features,
        doctor_explanation,
        possible_causes,
        interpretation,
        reasoning_bullets,
        actions_today,
        red_flags,
        follow_up_questions,
        ui_strings,
        summary,
    }
}

fn stool_features(map: &Map<String, Value>, tpl: &StoolFeatures) -> StoolFeatures {
    StoolFeatures {
        bristol_type: coerce::bristol_type(map.get("bristol_type")),
        bristol_range: coerce::string_or(map.get("bristol_range"), &tpl.bristol_range),
        shape: coerce::string_or(map.get("shape"), &tpl.shape),
        shape_desc: coerce::string_or(map.get("shape_desc"), &tpl.shape_desc),
        color: coerce::string_or(map.get("color"), &tpl.color),
        color_desc: coerce::string_or(map.get("color_desc"), &tpl.color_desc),
        color_reason: coerce::string_or(map.get("color_reason"), &tpl.color_reason),
        texture: coerce::string_or(map.get("texture"), &tpl.texture),
        texture_desc: coerce::string_or(map.get("texture_desc"), &tpl.texture_desc),
        abnormal_signs: ensure_min_items(
            string_list(map.get("abnormal_signs")),
            1,
            &tpl.abnormal_signs,
        ),
        volume: coerce::enum_field(map.get("volume")),
        wateriness: coerce::enum_field(map.get("wateriness")),
        mucus: coerce::enum_field(map.get("mucus")),
        foam: coerce::enum_field(map.get("foam")),
        blood: coerce::enum_field(map.get("blood")),
        undigested_food: coerce::enum_field(map.get("undigested_food")),
        separation_layers: coerce::enum_field(map.get("separation_layers")),
        odor_level: coerce::enum_field(map.get("odor_level")),
        visible_findings: ensure_min_items(
            string_list(map.get("visible_findings")),
            1,
            &tpl.visible_findings,
        ),
    }
}

fn doctor(
    map: &Map<String, Value>,
    tpl: &Template,
    headline: &str,
    interpretation: &Interpretation,
) -> DoctorExplanation {
    const SHAPE_FALLBACK: &str = "形态信息不足，建议补拍清晰图片。";
    const COLOR_FALLBACK: &str = "颜色信息不足，建议补拍清晰图片。";
    const TEXTURE_FALLBACK: &str = "质地信息不足，建议补拍清晰图片。";

    let shape = coerce::string_or(map.get("shape"), SHAPE_FALLBACK);
    let color = coerce::string_or(map.get("color"), COLOR_FALLBACK);
    let texture = coerce::string_or(map.get("texture"), TEXTURE_FALLBACK);

    let va = coerce::object(map.get("visual_analysis"));
    let visual_analysis = VisualAnalysis {
        shape: coerce::string_or(va.get("shape"), &shape),
        color: coerce::string_or(va.get("color"), &color),
        texture: coerce::string_or(va.get("texture"), &texture),
    };

    DoctorExplanation {
        one_sentence_conclusion: coerce::string_or(map.get("one_sentence_conclusion"), headline),
        combined_judgement: coerce::string_or(
            map.get("combined_judgement"),
            &interpretation.overall_judgement,
        ),
        causes: coerce::string_or(map.get("causes"), &tpl.doctor_explanation.causes),
        todo: coerce::string_or(map.get("todo"), &tpl.doctor_explanation.todo),
        red_flags: coerce::string_or(map.get("red_flags"), &tpl.doctor_explanation.red_flags),
        reassure: coerce::string_or(map.get("reassure"), &tpl.doctor_explanation.reassure),
        shape,
        color,
        texture,
        visual_analysis,
    }
}

fn causes(value: Option<&Value>) -> Vec<Cause> {
    let list = match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(m) => Cause {
                    title: coerce::string_or(m.get("title"), "常见原因"),
                    explanation: coerce::string_or(
                        m.get("explanation"),
                        "常见原因导致的短期变化。",
                    ),
                },
                _ => template::cause("饮食结构影响", "近期饮食变化会让便便更偏软。"),
            })
            .collect(),
        _ => Vec::new(),
    };
    ensure_min_items(list, 3, &template::DEFAULT_CAUSES)
}

fn longform(
    map: &Map<String, Value>,
    headline: &str,
    features: &StoolFeatures,
    interpretation: &Interpretation,
    reasoning_bullets: &[String],
    actions: &ActionsToday,
    red_flags: &[RedFlag],
) -> Longform {
    let take_join = |items: &[String], n: usize| {
        items
            .iter()
            .take(n)
            .cloned()
            .collect::<Vec<_>>()
            .join("；")
    };

    let how_to_read = format!(
        "形态：{}；颜色：{}；质地：{}。",
        features.shape_desc, features.color_desc, features.texture_desc
    );
    let todo = format!(
        "✅可以做：{}；❌少一点：{}；👀观察：{}",
        take_join(&actions.diet, 2),
        take_join(&actions.avoid, 2),
        take_join(&actions.observe, 2),
    );
    let flags = red_flags
        .iter()
        .take(2)
        .map(|f| format!("{}（{}）", f.title, f.detail))
        .collect::<Vec<_>>()
        .join("；");

    Longform {
        conclusion: coerce::trimmed(map.get("conclusion"))
            .or_else(|| (!headline.is_empty()).then(|| headline.to_string()))
            .unwrap_or_else(|| "整体情况需要继续观察。".into()),
        how_to_read: coerce::string_or(map.get("how_to_read"), &how_to_read),
        context: coerce::trimmed(map.get("context"))
            .unwrap_or_else(|| interpretation.how_context_affects.join("；")),
        causes: coerce::trimmed(map.get("causes"))
            .unwrap_or_else(|| take_join(reasoning_bullets, 3)),
        todo: coerce::string_or(map.get("todo"), &todo),
        red_flags: coerce::string_or(map.get("red_flags"), &flags),
        reassure: coerce::string_or(
            map.get("reassure"),
            "若精神和食欲良好、尿量正常，通常可先在家观察并记录变化。",
        ),
    }
}

fn retake_report(headline: &str, fragments: &[String]) -> RetakeReport {
    let how_context_affects = if fragments.is_empty() {
        vec!["本次仅用于确认是否为大便图片".to_string()]
    } else {
        fragments.to_vec()
    };

    let conclusion = if headline.is_empty() {
        "这张图片未识别到大便，暂时无法分析。".to_string()
    } else {
        headline.to_string()
    };

    let summary = "未识别到大便图片，建议重新拍摄后再分析。".to_string();

    RetakeReport {
        is_stool_image: false,
        stool_features: (),
        doctor_explanation: DoctorExplanation {
            one_sentence_conclusion: conclusion,
            shape: String::new(),
            color: String::new(),
            texture: String::new(),
            visual_analysis: VisualAnalysis {
                shape: String::new(),
                color: String::new(),
                texture: String::new(),
            },
            combined_judgement: String::new(),
            causes: String::new(),
            todo: String::new(),
            red_flags: String::new(),
            reassure: String::new(),
        },
        possible_causes: Vec::new(),
        interpretation: Interpretation {
            overall_judgement: "无法判断是否为大便图片".into(),
            why_shape: Vec::new(),
            why_color: Vec::new(),
            why_texture: Vec::new(),
            how_context_affects,
            confidence_explain: "当前图片未识别为大便，无法进入健康分析。".into(),
        },
        reasoning_bullets: Vec::new(),
        actions_today: ActionsToday::empty(),
        red_flags: Vec::new(),
        follow_up_questions: vec![
            "是否选错了图片？".into(),
            "是否需要重新拍摄更清晰的照片？".into(),
        ],
        ui_strings: retake_ui(summary.clone()),
        summary,
        bristol_type: None,
        color: None,
        texture: None,
        hydration_hint: String::new(),
        diet_advice: Vec::new(),
    }
}

fn retake_ui(summary: String) -> UiStrings {
    let section = |title: &str, icon_key: &str, items: &[&str]| Section {
        title: title.into(),
        icon_key: icon_key.into(),
        items: items.iter().map(|s| s.to_string()).collect(),
    };

    UiStrings {
        summary,
        tags: vec!["非大便图片".into()],
        sections: vec![
            section(
                "无法分析的原因",
                "camera",
                &[
                    "图片中未识别到大便",
                    "可能拍到其他物体或场景",
                    "目标不清晰或被遮挡",
                ],
            ),
            section(
                "如何重拍",
                "retry",
                &[
                    "光线充足，避免背光/反光",
                    "对焦清晰，目标占画面 50% 以上",
                    "尽量减少背景干扰",
                ],
            ),
            section(
                "常见错误示例",
                "info",
                &[
                    "拍到纸巾/地面/玩具/衣物",
                    "画面过暗或强反光",
                    "目标过小或被遮挡",
                ],
            ),
            section(
                "建议补充信息",
                "question",
                &["气味/是否疼痛", "排便次数", "是否便血/黑便"],
            ),
        ],
        longform: Longform {
            conclusion: "这张图片未识别到大便，暂时无法分析。".into(),
            how_to_read: "当前图片无法用于判断大便性状，请更清晰地重新拍摄。".into(),
            context: "本次仅用于确认是否为大便图片，无需补充更多信息。".into(),
            causes: "可能选错图片或目标未清晰入镜。".into(),
            todo: "请重新拍摄：光线充足、对焦清晰、目标占画面 50% 以上。".into(),
            red_flags: "如宝宝出现持续发热、便血或精神明显差，请及时就医。".into(),
            reassure: "这是识别失败提示，并非健康结论。".into(),
        },
    }
}

fn coerce_image_validation(value: Option<&Value>) -> Option<ImageValidation> {
    match value {
        Some(Value::Object(map)) => Some(ImageValidation {
            status: coerce::string_or(map.get("status"), "unknown"),
            reason: coerce::string_or(map.get("reason"), ""),
            tips: string_list(map.get("tips")),
        }),
        _ => None,
    }
}
