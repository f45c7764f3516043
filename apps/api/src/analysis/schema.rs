//! Authoritative shape of an analysis result.
//!
//! The bounds below drive both the JSON Schema sent to the model and the
//! validator that gates its output, so the two cannot drift apart.

use serde_json::{json, Map, Value};

/// Inclusive `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, n: usize) -> bool {
        (self.min..=self.max).contains(&n)
    }
}

/// Cardinality of a string array plus the length bounds of each entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListRule {
    pub items: Bounds,
    pub chars: Bounds,
}

pub const SCORE_MIN: i64 = 0;
pub const SCORE_MAX: i64 = 100;

pub const STRENGTHS: ListRule = ListRule {
    items: Bounds::new(3, 8),
    chars: Bounds::new(10, 200),
};
pub const WEAKNESSES: ListRule = STRENGTHS;
pub const SUGGESTIONS: ListRule = ListRule {
    items: Bounds::new(3, 7),
    chars: Bounds::new(15, 250),
};
pub const SKILL_LIST: ListRule = ListRule {
    items: Bounds::new(0, 15),
    chars: Bounds::new(0, 100),
};
pub const NOTES: Bounds = Bounds::new(50, 500);

pub const ROOT_KEYS: &[&str] = &["overallScore", "analysis"];
pub const ANALYSIS_KEYS: &[&str] = &[
    "strengths",
    "weaknesses",
    "skillsBreakdown",
    "suggestions",
    "detailedAnalysis",
];
pub const SKILLS_BREAKDOWN_KEYS: &[&str] = &["technical", "experience", "education", "soft_skills"];
pub const DETAILED_ANALYSIS_KEYS: &[&str] =
    &["technicalSkills", "experienceNotes", "educationNotes"];
pub const TECHNICAL_SKILLS_KEYS: &[&str] = &["matched", "missing"];

/// JSON Schema (draft-07) for `AnalysisResult`.
pub fn analysis_json_schema() -> Value {
    let breakdown: Map<String, Value> = SKILLS_BREAKDOWN_KEYS
        .iter()
        .map(|key| (key.to_string(), score_schema(None)))
        .collect();

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "CV Analysis Results Schema",
        "type": "object",
        "properties": {
            "overallScore": score_schema(Some("Overall job fit score as a percentage (0-100)")),
            "analysis": {
                "type": "object",
                "properties": {
                    "strengths": list_schema(
                        &STRENGTHS,
                        Some("Key strengths and matches between CV and job requirements"),
                    ),
                    "weaknesses": list_schema(
                        &WEAKNESSES,
                        Some("Areas for improvement and missing requirements"),
                    ),
                    "skillsBreakdown": {
                        "type": "object",
                        "properties": breakdown,
                        "required": SKILLS_BREAKDOWN_KEYS,
                        "additionalProperties": false,
                    },
                    "suggestions": list_schema(
                        &SUGGESTIONS,
                        Some("Actionable improvement recommendations"),
                    ),
                    "detailedAnalysis": {
                        "type": "object",
                        "properties": {
                            "technicalSkills": {
                                "type": "object",
                                "properties": {
                                    "matched": list_schema(&SKILL_LIST, None),
                                    "missing": list_schema(&SKILL_LIST, None),
                                },
                                "required": TECHNICAL_SKILLS_KEYS,
                                "additionalProperties": false,
                            },
                            "experienceNotes": text_schema(NOTES),
                            "educationNotes": text_schema(NOTES),
                        },
                        "required": DETAILED_ANALYSIS_KEYS,
                        "additionalProperties": false,
                    },
                },
                "required": ANALYSIS_KEYS,
                "additionalProperties": false,
            },
        },
        "required": ROOT_KEYS,
        "additionalProperties": false,
    })
}

/// Compact serialization used inside the system instruction.
pub fn analysis_schema_text() -> String {
    analysis_json_schema().to_string()
}

fn score_schema(description: Option<&str>) -> Value {
    let mut schema = json!({ "type": "integer", "minimum": SCORE_MIN, "maximum": SCORE_MAX });
    describe(&mut schema, description);
    schema
}

fn text_schema(bounds: Bounds) -> Value {
    let mut schema = json!({ "type": "string", "maxLength": bounds.max });
    if bounds.min > 0 {
        schema["minLength"] = json!(bounds.min);
    }
    schema
}

fn list_schema(rule: &ListRule, description: Option<&str>) -> Value {
    let mut schema = json!({
        "type": "array",
        "items": text_schema(rule.chars),
        "maxItems": rule.items.max,
    });
    if rule.items.min > 0 {
        schema["minItems"] = json!(rule.items.min);
    }
    describe(&mut schema, description);
    schema
}

fn describe(schema: &mut Value, description: Option<&str>) {
    if let Some(description) = description {
        schema["description"] = json!(description);
    }
}
