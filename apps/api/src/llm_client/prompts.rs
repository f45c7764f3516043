// Shared prompt fragments. Each pipeline that calls the gateway keeps its own
// prompts.rs alongside it; only cross-cutting pieces live here.

/// Lead-in placed directly before a serialized JSON Schema in a system
/// instruction.
pub const SCHEMA_PREAMBLE: &str =
    "\nReturn ONLY valid JSON matching this schema (no prose, no code fences):\n";

/// Appended as the final user part so the last thing the model reads is
/// the output format.
pub const JSON_RESPONSE_CUE: &str = "\nReturn the analysis as JSON:";

/// Response MIME type hint understood by the gateway.
pub const JSON_MIME_TYPE: &str = "application/json";
