use serde::{Deserialize, Serialize};

/// Validated fit analysis returned to callers. Only ever constructed by the
/// validator, so every instance satisfies the bounds in `schema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub analysis: Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub skills_breakdown: SkillsBreakdown,
    pub suggestions: Vec<String>,
    pub detailed_analysis: DetailedAnalysis,
}

/// Four-axis sub-score. Field names are serialized as-is (`soft_skills`
/// keeps its underscore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillsBreakdown {
    pub technical: u8,
    pub experience: u8,
    pub education: u8,
    pub soft_skills: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedAnalysis {
    pub technical_skills: TechnicalSkills,
    pub experience_notes: String,
    pub education_notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnicalSkills {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}
