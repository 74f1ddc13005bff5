//! Typed wire model for the normalized analysis response.
//!
//! The classification gate is a tagged variant ([`Outcome`]): a negative
//! classification cannot carry stool features, so the "not stool but
//! populated features" state is unrepresentable.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// The fully-populated response contract returned to the client.
///
/// Every field is present after normalization; consumers can rely on the
/// cardinality floors and enum domains without re-validating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    pub ok: bool,
    pub schema_version: u32,
    pub worker_version: String,
    pub proxy_version: String,
    pub model_used: String,
    pub model_primary: String,
    pub model_fallback: String,
    pub used_fallback: bool,
    pub primary_error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub headline: String,
    pub score: f64,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub uncertainty_note: String,
    pub explanation: String,
    pub context_summary: String,
    pub analysis_basis: AnalysisBasis,
    pub input_echo: InputEcho,
    pub image_validation: Option<ImageValidation>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl NormalizedResult {
    pub fn is_stool_image(&self) -> bool {
        matches!(self.outcome, Outcome::Stool(_))
    }
}

/// The two disjoint output shapes behind the classification gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Stool(StoolReport),
    NotStool(RetakeReport),
}

/// Positive-classification payload: full feature analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoolReport {
    pub is_stool_image: bool,
    pub stool_features: StoolFeatures,
    pub doctor_explanation: DoctorExplanation,
    pub possible_causes: Vec<Cause>,
    pub interpretation: Interpretation,
    pub reasoning_bullets: Vec<String>,
    pub actions_today: ActionsToday,
    pub red_flags: Vec<RedFlag>,
    pub follow_up_questions: Vec<String>,
    pub ui_strings: UiStrings,
    pub summary: String,
    // Backward-compatible flat fields, always derived from the nested ones.
    pub bristol_type: Option<i64>,
    pub color: Option<String>,
    pub texture: Option<String>,
    pub hydration_hint: String,
    pub diet_advice: Vec<String>,
}

/// Negative-classification payload: retake guidance only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetakeReport {
    pub is_stool_image: bool,
    #[serde(serialize_with = "unit_as_null")]
    pub stool_features: (),
    pub doctor_explanation: DoctorExplanation,
    pub possible_causes: Vec<Cause>,
    pub interpretation: Interpretation,
    pub reasoning_bullets: Vec<String>,
    pub actions_today: ActionsToday,
    pub red_flags: Vec<RedFlag>,
    pub follow_up_questions: Vec<String>,
    pub ui_strings: UiStrings,
    pub summary: String,
    pub bristol_type: Option<i64>,
    pub color: Option<String>,
    pub texture: Option<String>,
    pub hydration_hint: String,
    pub diet_advice: Vec<String>,
}

fn unit_as_null<S: Serializer>(_: &(), serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_none()
}

/// Allow-listed enum field: the declared keyword table plus a documented
/// default, interpreted by one generic coercion routine (`coerce::enum_field`).
pub trait EnumField: Sized + Copy + 'static {
    const DEFAULT: Self;
    const ALLOWED: &'static [(&'static str, Self)];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl EnumField for RiskLevel {
    const DEFAULT: Self = RiskLevel::Low;
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("low", RiskLevel::Low),
        ("medium", RiskLevel::Medium),
        ("high", RiskLevel::High),
        ("unknown", RiskLevel::Unknown),
    ];
}

/// Tri-state visual finding: absent, suspected, or clearly present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriState {
    None,
    Suspected,
    Present,
}

impl EnumField for TriState {
    const DEFAULT: Self = TriState::None;
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("none", TriState::None),
        ("suspected", TriState::Suspected),
        ("present", TriState::Present),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Wateriness {
    None,
    Mild,
    Moderate,
    Severe,
}

impl EnumField for Wateriness {
    const DEFAULT: Self = Wateriness::None;
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("none", Wateriness::None),
        ("mild", Wateriness::Mild),
        ("moderate", Wateriness::Moderate),
        ("severe", Wateriness::Severe),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Volume {
    Small,
    Medium,
    Large,
    Unknown,
}

impl EnumField for Volume {
    const DEFAULT: Self = Volume::Unknown;
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("small", Volume::Small),
        ("medium", Volume::Medium),
        ("large", Volume::Large),
        ("unknown", Volume::Unknown),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OdorLevel {
    Normal,
    Strong,
    VeryStrong,
    Unknown,
}

impl EnumField for OdorLevel {
    const DEFAULT: Self = OdorLevel::Unknown;
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("normal", OdorLevel::Normal),
        ("strong", OdorLevel::Strong),
        ("very_strong", OdorLevel::VeryStrong),
        ("unknown", OdorLevel::Unknown),
    ];
}

/// Visual stool characteristics; present only on the positive branch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoolFeatures {
    /// Bristol scale, 1-7; anything else normalizes to null.
    pub bristol_type: Option<i64>,
    pub bristol_range: String,
    pub shape: String,
    pub shape_desc: String,
    pub color: String,
    pub color_desc: String,
    pub color_reason: String,
    pub texture: String,
    pub texture_desc: String,
    pub abnormal_signs: Vec<String>,
    pub volume: Volume,
    pub wateriness: Wateriness,
    pub mucus: TriState,
    pub foam: TriState,
    pub blood: TriState,
    pub undigested_food: TriState,
    pub separation_layers: TriState,
    pub odor_level: OdorLevel,
    pub visible_findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualAnalysis {
    pub shape: String,
    pub color: String,
    pub texture: String,
}

/// Narrative explanation in a pediatrician's register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorExplanation {
    pub one_sentence_conclusion: String,
    pub shape: String,
    pub color: String,
    pub texture: String,
    pub visual_analysis: VisualAnalysis,
    pub combined_judgement: String,
    pub causes: String,
    pub todo: String,
    pub red_flags: String,
    pub reassure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cause {
    pub title: String,
    pub explanation: String,
}

/// Evidence for the judgement, grouped by what it explains.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub overall_judgement: String,
    pub why_shape: Vec<String>,
    pub why_color: Vec<String>,
    pub why_texture: Vec<String>,
    pub how_context_affects: Vec<String>,
    pub confidence_explain: String,
}

/// Parent-executable advice, split by category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionsToday {
    pub diet: Vec<String>,
    pub hydration: Vec<String>,
    pub care: Vec<String>,
    pub avoid: Vec<String>,
    pub observe: Vec<String>,
}

impl ActionsToday {
    pub fn empty() -> Self {
        Self {
            diet: Vec::new(),
            hydration: Vec::new(),
            care: Vec::new(),
            avoid: Vec::new(),
            observe: Vec::new(),
        }
    }

    /// All categories concatenated, used as section-item filler.
    pub fn all_items(&self) -> Vec<String> {
        let mut items = Vec::with_capacity(
            self.diet.len()
                + self.hydration.len()
                + self.care.len()
                + self.avoid.len()
                + self.observe.len(),
        );
        items.extend(self.diet.iter().cloned());
        items.extend(self.hydration.iter().cloned());
        items.extend(self.care.iter().cloned());
        items.extend(self.avoid.iter().cloned());
        items.extend(self.observe.iter().cloned());
        items
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedFlag {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub icon_key: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Longform {
    pub conclusion: String,
    pub how_to_read: String,
    pub context: String,
    pub causes: String,
    pub todo: String,
    pub red_flags: String,
    pub reassure: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiStrings {
    pub summary: String,
    pub tags: Vec<String>,
    pub sections: Vec<Section>,
    pub longform: Longform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisBasis {
    pub image_only: Vec<String>,
    pub combined_reasoning: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputEcho {
    pub context: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageValidation {
    pub status: String,
    pub reason: String,
    pub tips: Vec<String>,
}
