//! Builds the gateway request for one CV-vs-job analysis. Pure: no I/O.

use crate::analysis::prompts::{
    CV_ANALYSIS_INSTRUCTIONS, CV_ANALYSIS_SYSTEM, CV_SECTION_HEADER, JOB_SECTION_HEADER,
};
use crate::analysis::schema::analysis_schema_text;
use crate::llm_client::prompts::{JSON_MIME_TYPE, JSON_RESPONSE_CUE, SCHEMA_PREAMBLE};
use crate::llm_client::{Content, GenerateContentRequest, GenerationConfig, Part, Role};

/// The model used for every analysis. Fixed so results stay comparable.
pub const MODEL: &str = "gemini-1.5-flash";
const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 1200;

pub fn build_analysis_request(job_text: &str, cv_text: &str) -> GenerateContentRequest {
    let schema = analysis_schema_text();
    let system_text = [CV_ANALYSIS_SYSTEM, SCHEMA_PREAMBLE, schema.as_str()].concat();

    GenerateContentRequest {
        model: MODEL.to_string(),
        system_instruction: Content {
            role: Role::System,
            parts: vec![Part::text(system_text)],
        },
        contents: vec![Content {
            role: Role::User,
            parts: vec![
                Part::text(CV_ANALYSIS_INSTRUCTIONS),
                Part::text(format!("{CV_SECTION_HEADER}{cv_text}")),
                Part::text(format!("{JOB_SECTION_HEADER}{job_text}")),
                Part::text(JSON_RESPONSE_CUE),
            ],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            response_mime_type: JSON_MIME_TYPE.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::schema::analysis_json_schema;

    #[test]
    fn test_build_is_deterministic() {
        let a = build_analysis_request("Rust engineer wanted", "Ten years of Rust");
        let b = build_analysis_request("Rust engineer wanted", "Ten years of Rust");
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_instruction_embeds_parseable_schema() {
        let request = build_analysis_request("job", "cv");
        assert_eq!(request.system_instruction.role, Role::System);
        let text = &request.system_instruction.parts[0].text;
        assert!(text.starts_with(CV_ANALYSIS_SYSTEM));

        let schema_start = text.find(SCHEMA_PREAMBLE).unwrap() + SCHEMA_PREAMBLE.len();
        let embedded: serde_json::Value = serde_json::from_str(&text[schema_start..]).unwrap();
        assert_eq!(embedded, analysis_json_schema());
    }

    #[test]
    fn test_user_parts_are_ordered_instructions_cv_job_cue() {
        let request = build_analysis_request("JOB BODY", "CV BODY");
        assert_eq!(request.contents.len(), 1);
        let content = &request.contents[0];
        assert_eq!(content.role, Role::User);

        let texts: Vec<&str> = content.parts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[0], CV_ANALYSIS_INSTRUCTIONS);
        assert_eq!(texts[1], "\nCV CONTENT:\nCV BODY");
        assert_eq!(texts[2], "\nJOB DESCRIPTION:\nJOB BODY");
        assert_eq!(texts[3], JSON_RESPONSE_CUE);
    }

    #[test]
    fn test_generation_config_is_low_temperature_json() {
        let config = build_analysis_request("job", "cv").generation_config;
        assert!((config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.max_output_tokens, 1200);
        assert_eq!(config.response_mime_type, "application/json");
    }

    #[test]
    fn test_wire_body_has_gateway_top_level_keys() {
        let body = serde_json::to_value(build_analysis_request("job", "cv")).unwrap();
        let keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["model", "systemInstruction", "contents", "generationConfig"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(body["model"], MODEL);
    }
}
