//! Parses model output and checks it against the result schema.
//!
//! Validation is all-or-nothing: every violation is collected (with a dotted
//! path) before anything is returned, and a typed result is only built when
//! there are none.

use serde_json::{Map, Value};

use crate::analysis::error::{AnalysisError, SchemaIssue};
use crate::analysis::models::{
    Analysis, AnalysisResult, DetailedAnalysis, SkillsBreakdown, TechnicalSkills,
};
use crate::analysis::schema::{
    Bounds, ListRule, ANALYSIS_KEYS, DETAILED_ANALYSIS_KEYS, NOTES, ROOT_KEYS, SCORE_MAX,
    SCORE_MIN, SKILLS_BREAKDOWN_KEYS, SKILL_LIST, STRENGTHS, SUGGESTIONS, TECHNICAL_SKILLS_KEYS,
    WEAKNESSES,
};

pub fn parse_and_validate(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let value = locate_json_object(text)?;

    let mut checker = Checker::default();
    let result = checker.result(&value);
    match result {
        Some(result) if checker.issues.is_empty() => Ok(result),
        _ => Err(AnalysisError::Schema(checker.issues)),
    }
}

/// Parses `text` as a JSON object, falling back to the span between the
/// first `{` and the last `}` when the model wrapped its answer in prose.
fn locate_json_object(text: &str) -> Result<Value, AnalysisError> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }

    let embedded = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => {
            return Err(AnalysisError::Parse(
                "no JSON object found in model output".to_string(),
            ))
        }
    };

    match serde_json::from_str::<Value>(embedded) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(other) => Err(AnalysisError::Parse(format!(
            "expected a JSON object, found {}",
            kind(&other)
        ))),
        Err(e) => Err(AnalysisError::Parse(e.to_string())),
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<SchemaIssue>,
}

impl Checker {
    fn issue(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(SchemaIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn result(&mut self, root: &Value) -> Option<AnalysisResult> {
        let root = self.object(Some(root), "", ROOT_KEYS)?;
        let overall_score = self.score(root.get("overallScore"), "overallScore");
        let analysis = self.analysis(root.get("analysis"), "analysis");
        Some(AnalysisResult {
            overall_score: overall_score?,
            analysis: analysis?,
        })
    }

    fn analysis(&mut self, value: Option<&Value>, path: &str) -> Option<Analysis> {
        let obj = self.object(value, path, ANALYSIS_KEYS)?;
        let strengths = self.list(obj.get("strengths"), &child(path, "strengths"), &STRENGTHS);
        let weaknesses = self.list(obj.get("weaknesses"), &child(path, "weaknesses"), &WEAKNESSES);
        let skills_breakdown =
            self.skills_breakdown(obj.get("skillsBreakdown"), &child(path, "skillsBreakdown"));
        let suggestions =
            self.list(obj.get("suggestions"), &child(path, "suggestions"), &SUGGESTIONS);
        let detailed_analysis =
            self.detailed_analysis(obj.get("detailedAnalysis"), &child(path, "detailedAnalysis"));
        Some(Analysis {
            strengths: strengths?,
            weaknesses: weaknesses?,
            skills_breakdown: skills_breakdown?,
            suggestions: suggestions?,
            detailed_analysis: detailed_analysis?,
        })
    }

    fn skills_breakdown(&mut self, value: Option<&Value>, path: &str) -> Option<SkillsBreakdown> {
        let obj = self.object(value, path, SKILLS_BREAKDOWN_KEYS)?;
        let technical = self.score(obj.get("technical"), &child(path, "technical"));
        let experience = self.score(obj.get("experience"), &child(path, "experience"));
        let education = self.score(obj.get("education"), &child(path, "education"));
        let soft_skills = self.score(obj.get("soft_skills"), &child(path, "soft_skills"));
        Some(SkillsBreakdown {
            technical: technical?,
            experience: experience?,
            education: education?,
            soft_skills: soft_skills?,
        })
    }

    fn detailed_analysis(
        &mut self,
        value: Option<&Value>,
        path: &str,
    ) -> Option<DetailedAnalysis> {
        let obj = self.object(value, path, DETAILED_ANALYSIS_KEYS)?;
        let technical_skills =
            self.technical_skills(obj.get("technicalSkills"), &child(path, "technicalSkills"));
        let experience_notes =
            self.text(obj.get("experienceNotes"), &child(path, "experienceNotes"), NOTES);
        let education_notes =
            self.text(obj.get("educationNotes"), &child(path, "educationNotes"), NOTES);
        Some(DetailedAnalysis {
            technical_skills: technical_skills?,
            experience_notes: experience_notes?,
            education_notes: education_notes?,
        })
    }

    fn technical_skills(&mut self, value: Option<&Value>, path: &str) -> Option<TechnicalSkills> {
        let obj = self.object(value, path, TECHNICAL_SKILLS_KEYS)?;
        let matched = self.list(obj.get("matched"), &child(path, "matched"), &SKILL_LIST);
        let missing = self.list(obj.get("missing"), &child(path, "missing"), &SKILL_LIST);
        Some(TechnicalSkills {
            matched: matched?,
            missing: missing?,
        })
    }

    /// Checks that `value` is an object and reports any key outside `keys`.
    fn object<'v>(
        &mut self,
        value: Option<&'v Value>,
        path: &str,
        keys: &[&str],
    ) -> Option<&'v Map<String, Value>> {
        let obj = match value {
            None => {
                self.issue(path, "required");
                return None;
            }
            Some(Value::Object(obj)) => obj,
            Some(other) => {
                self.issue(path, format!("expected object, received {}", kind(other)));
                return None;
            }
        };
        for key in obj.keys().filter(|k| !keys.contains(&k.as_str())) {
            self.issue(&child(path, key), "unrecognized key");
        }
        Some(obj)
    }

    fn score(&mut self, value: Option<&Value>, path: &str) -> Option<u8> {
        let n = match value {
            None => {
                self.issue(path, "required");
                return None;
            }
            Some(Value::Number(n)) => n,
            Some(other) => {
                self.issue(path, format!("expected integer, received {}", kind(other)));
                return None;
            }
        };

        let int = match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i,
            (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => f as i64,
            _ => {
                self.issue(path, format!("expected integer, received {n}"));
                return None;
            }
        };

        if !(SCORE_MIN..=SCORE_MAX).contains(&int) {
            self.issue(
                path,
                format!("must be between {SCORE_MIN} and {SCORE_MAX}, received {int}"),
            );
            return None;
        }
        u8::try_from(int).ok()
    }

    /// String length is counted in Unicode scalar values.
    fn text(&mut self, value: Option<&Value>, path: &str, bounds: Bounds) -> Option<String> {
        let s = match value {
            None => {
                self.issue(path, "required");
                return None;
            }
            Some(Value::String(s)) => s,
            Some(other) => {
                self.issue(path, format!("expected string, received {}", kind(other)));
                return None;
            }
        };

        let len = s.chars().count();
        if len < bounds.min {
            self.issue(
                path,
                format!("must be at least {} characters, received {len}", bounds.min),
            );
            return None;
        }
        if len > bounds.max {
            self.issue(
                path,
                format!("must be at most {} characters, received {len}", bounds.max),
            );
            return None;
        }
        Some(s.clone())
    }

    fn list(&mut self, value: Option<&Value>, path: &str, rule: &ListRule) -> Option<Vec<String>> {
        let items = match value {
            None => {
                self.issue(path, "required");
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.issue(path, format!("expected array, received {}", kind(other)));
                return None;
            }
        };

        let count_ok = rule.items.contains(items.len());
        if items.len() < rule.items.min {
            self.issue(
                path,
                format!("must contain at least {} items, received {}", rule.items.min, items.len()),
            );
        } else if items.len() > rule.items.max {
            self.issue(
                path,
                format!("must contain at most {} items, received {}", rule.items.max, items.len()),
            );
        }

        let checked: Vec<Option<String>> = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.text(Some(item), &child(path, &i.to_string()), rule.chars))
            .collect();

        let strings = checked.into_iter().collect::<Option<Vec<_>>>()?;
        count_ok.then_some(strings)
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
