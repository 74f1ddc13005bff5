//! Canonical template and default rotation tables.
//!
//! [`canonical`] builds a brand-new tree on every call so concurrent
//! normalizations never share nested collections. The rotation tables are
//! process-wide read-only data; coercers copy out of them and never write
//! back.

use once_cell::sync::Lazy;

use super::result::{
    AnalysisBasis, Cause, DoctorExplanation, Interpretation, OdorLevel, RedFlag, RiskLevel,
    Section, StoolFeatures, TriState, VisualAnalysis, Volume, Wateriness,
};

/// Baseline values every normalization starts from.
#[derive(Debug, Clone)]
pub struct Template {
    pub score: f64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub stool_features: StoolFeatures,
    pub doctor_explanation: DoctorExplanation,
    pub interpretation: Interpretation,
    pub context_summary: String,
    pub analysis_basis: AnalysisBasis,
    pub ui_sections: Vec<Section>,
}

/// Build a fresh, fully-populated template tree.
pub fn canonical() -> Template {
    Template {
        score: 50.0,
        confidence: 0.6,
        risk_level: RiskLevel::Low,
        stool_features: StoolFeatures {
            bristol_type: None,
            bristol_range: "unknown".into(),
            shape: "偏软/糊状".into(),
            shape_desc: "unknown".into(),
            color: "黄褐/偏黄".into(),
            color_desc: "unknown".into(),
            color_reason: "多与饮食构成和肠道通过速度相关".into(),
            texture: "细腻/糊状".into(),
            texture_desc: "unknown".into(),
            abnormal_signs: vec!["未见明显异常".into()],
            volume: Volume::Unknown,
            wateriness: Wateriness::None,
            mucus: TriState::None,
            foam: TriState::None,
            blood: TriState::None,
            undigested_food: TriState::None,
            separation_layers: TriState::None,
            odor_level: OdorLevel::Unknown,
            visible_findings: vec!["none".into()],
        },
        doctor_explanation: DoctorExplanation {
            one_sentence_conclusion: String::new(),
            shape: String::new(),
            color: String::new(),
            texture: String::new(),
            visual_analysis: VisualAnalysis {
                shape: String::new(),
                color: String::new(),
                texture: String::new(),
            },
            combined_judgement: String::new(),
            causes: "可能与饮食结构或短期消化变化有关，需结合近期情况判断。".into(),
            todo: "建议补拍清晰图片并记录 24-48 小时变化，必要时咨询医生。".into(),
            red_flags: "如出现发热、便血、频繁呕吐或精神差，应尽快就医。".into(),
            reassure: "若精神食欲良好且尿量正常，通常可先观察并持续记录。".into(),
        },
        interpretation: Interpretation {
            overall_judgement: "需要结合更多信息判断".into(),
            why_shape: vec![
                "图片角度与光线影响形态判断".into(),
                "仅凭单张图片可能低估真实形态".into(),
            ],
            why_color: vec![
                "颜色受光照与拍摄设备影响".into(),
                "需结合近期饮食判断颜色变化".into(),
            ],
            why_texture: vec![
                "质地可能受水分与拍摄焦距影响".into(),
                "需结合是否拉稀或成形判断".into(),
            ],
            how_context_affects: vec![
                "未提供补充信息，无法判断饮食与症状关联".into(),
                "若近期有发热/腹痛需提高警惕".into(),
                "若精神食欲正常则更偏功能性变化".into(),
            ],
            confidence_explain: "缺少完整补充信息，置信度有限。".into(),
        },
        context_summary: "未提供补充信息，仅基于图片判断。".into(),
        analysis_basis: AnalysisBasis {
            image_only: DEFAULT_IMAGE_ONLY.clone(),
            combined_reasoning: DEFAULT_COMBINED_REASONING.clone(),
        },
        ui_sections: vec![
            section("饮食", "diet"),
            section("补液", "hydration"),
            section("护理", "care"),
            section("警戒信号", "warning"),
        ],
    }
}

fn section(title: &str, icon_key: &str) -> Section {
    Section {
        title: title.into(),
        icon_key: icon_key.into(),
        items: Vec::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub static DEFAULT_REASONING: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "图片角度或光线可能影响判断准确性",
        "结合近期饮食与症状信息综合分析",
        "当前结果更像短期饮食或消化变化",
        "建议持续记录 24-48 小时变化",
        "如出现不适或异常症状需及时就医",
    ])
});

pub static DEFAULT_IMAGE_ONLY: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "图片中可见的形态与质地特征",
        "颜色分布与光照条件下的表现",
        "是否可见明显异物/血丝/粘液",
        "整体成形度与水样分离情况",
    ])
});

pub static DEFAULT_COMBINED_REASONING: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "图片特征与补充信息综合后更偏向功能性变化",
        "饮食与饮水情况可能影响颜色与质地",
        "精神状态与症状有助判断是否存在感染迹象",
        "如无发热/呕吐更支持可观察的短期变化",
        "若补充信息不足需保留不确定性",
    ])
});

pub static DEFAULT_DIET: Lazy<Vec<String>> =
    Lazy::new(|| strings(&["清淡易消化饮食", "少量多餐，观察耐受", "适量软熟蔬果补充"]));

pub static DEFAULT_HYDRATION: Lazy<Vec<String>> =
    Lazy::new(|| strings(&["少量多次补液", "观察尿量是否减少", "必要时口服补液盐"]));

pub static DEFAULT_CARE: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "便后温水清洁并保持干爽",
        "注意皮肤红肿或破损",
        "记录排便次数与性状变化",
    ])
});

pub static DEFAULT_AVOID: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "避免油炸/辛辣/高糖食物",
        "暂避冰冷刺激饮品",
        "避免一次性大量进食",
    ])
});

pub static DEFAULT_OBSERVE: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "精神与食欲是否下降",
        "排便次数是否增多",
        "是否伴随发热或呕吐",
    ])
});

/// Filler for the rebuilt "warning" section when red flags run short.
pub static WARNING_FILLER: Lazy<Vec<String>> =
    Lazy::new(|| strings(&["出现便血或黑便", "持续高热或明显不适", "频繁呕吐"]));

pub static DEFAULT_RED_FLAGS: Lazy<Vec<RedFlag>> = Lazy::new(|| {
    vec![
        red_flag("明显便血或黑便", "若出现请尽快就医"),
        red_flag("持续高热或精神萎靡", "超过 24 小时需就医"),
        red_flag("频繁呕吐或无法进食", "提示脱水风险"),
        red_flag("尿量明显减少/口干", "可能存在脱水"),
        red_flag("腹痛剧烈或持续哭闹", "需及时评估"),
    ]
});

fn red_flag(title: &str, detail: &str) -> RedFlag {
    RedFlag {
        title: title.into(),
        detail: detail.into(),
    }
}

pub static DEFAULT_CAUSES: Lazy<Vec<Cause>> = Lazy::new(|| {
    vec![
        cause("饮食结构影响", "水果或含水量高的食物增加会让便便偏软。"),
        cause("肠道蠕动偏快", "幼儿阶段肠道功能调试期，容易偏软。"),
        cause("轻微受凉或作息变化", "环境变化可短暂影响消化节律。"),
    ]
});

pub fn cause(title: &str, explanation: &str) -> Cause {
    Cause {
        title: title.into(),
        explanation: explanation.into(),
    }
}

pub static DEFAULT_FOLLOW_UPS: Lazy<Vec<String>> = Lazy::new(|| {
    strings(&[
        "是否发热？",
        "是否持续呕吐？",
        "24 小时内排便次数多少？",
        "是否出现便血/黑便/灰白便？",
        "尿量是否减少？",
        "最近饮食是否有明显变化？",
    ])
});
