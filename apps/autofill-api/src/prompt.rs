//! Prompt construction for the extraction model
//!
//! The autofill prompt pins the exact response schema, the output rules that
//! keep replies parseable, the citation whitelist, and the retrieved policy
//! excerpts. The reprint prompt asks the model to re-emit the full object
//! after invalid or truncated output, quoting the previous attempt.

use serde_json::Value;

use crate::models::AutofillRequest;

/// Probe sent by the model health endpoint.
pub const MODEL_PROBE_PROMPT: &str = "Reply with exactly: MODEL_OK";

/// Lexical query fed to the policy retriever for a request.
pub fn retrieval_query(req: &AutofillRequest) -> String {
    format!(
        "form_type={} advisor_notes={} client_profile={}",
        req.form_type,
        req.advisor_notes,
        profile_json(req)
    )
}

fn profile_json(req: &AutofillRequest) -> String {
    let profile = req.client_profile.clone().unwrap_or_else(|| Value::Object(Default::default()));
    serde_json::to_string(&profile).unwrap_or_else(|_| "{}".to_string())
}

/// Build the extraction prompt for a request plus its retrieved excerpts.
pub fn autofill_prompt(req: &AutofillRequest, excerpts: &[(String, String)]) -> String {
    let retrieved_block = if excerpts.is_empty() {
        "(none)".to_string()
    } else {
        excerpts
            .iter()
            .map(|(id, text)| format!("SOURCE_ID: {id}\nEXCERPT: {text}"))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        r#"You are a financial compliance assistant.

Return ONLY valid JSON (no markdown, no extra text).
- Never include trailing commas.
- Never include comments.
- Never wrap the JSON in triple backticks.
- Keep outputs SHORT to avoid truncation:
  - explanations: max 1 short sentence per field (<= 120 chars)
  - risk_flags: max 5 items
  - missing_fields: max 10 items
Follow this exact JSON schema:

{{
  "form_type": "{form_type}",
  "autofilled_fields": {{
    "client_age": 0,
    "time_horizon_years": 0,
    "risk_tolerance": "",
    "primary_goal": "",
    "recommended_action_summary": "",
    "risk_disclosure_summary": ""
  }},
  "missing_fields": ["..."],
  "risk_flags": ["..."],
  "explanations": {{
    "client_age": "",
    "time_horizon_years": "",
    "risk_tolerance": "",
    "primary_goal": "",
    "recommended_action_summary": "",
    "risk_disclosure_summary": ""
  }},
  "citations": {{
    "client_age": [],
    "time_horizon_years": [],
    "risk_tolerance": [],
    "primary_goal": [],
    "recommended_action_summary": [],
    "risk_disclosure_summary": []
  }}
}}

RULES:
- Use advisor_notes + client_profile when available.
- You MAY also use the POLICY EXCERPTS below (they come from public SEC/FINRA documents).
- Be conservative: if information is missing, put the field name in missing_fields.
- risk_flags should identify potential compliance issues (e.g. mismatch between risk tolerance and recommendation).
- citations must be a list of strings for each field.
  Allowed citation strings are only:
  - "advisor_notes"
  - "client_profile"
  - any SOURCE_ID from POLICY EXCERPTS (exactly as shown)
- If you did not use a source for a field, leave its citations list empty.

INPUT:
advisor_notes: {advisor_notes}
client_profile: {client_profile}

POLICY EXCERPTS:
{retrieved_block}"#,
        form_type = req.form_type,
        advisor_notes = req.advisor_notes,
        client_profile = profile_json(req),
        retrieved_block = retrieved_block,
    )
}

/// Ask the model to re-emit the full object after invalid/truncated output.
pub fn reprint_prompt(bad_output: &str) -> String {
    format!(
        "You returned output that was invalid or truncated. \
         Reprint the FULL JSON object only, matching the exact same schema.\n\
         Requirements:\n\
         - JSON only (no markdown/backticks)\n\
         - No trailing commas\n\
         - Keep explanations <= 160 chars each\n\
         - citations values must always be JSON arrays (even if empty)\n\n\
         PREVIOUS_OUTPUT (for reference):\n{bad_output}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> AutofillRequest {
        AutofillRequest {
            advisor_notes: "Client wants steady retirement income.".to_string(),
            client_profile: Some(json!({"age": 61})),
            form_type: "suitability".to_string(),
            use_policy_docs: true,
            top_k_docs: 4,
        }
    }

    #[test]
    fn prompt_names_every_schema_field() {
        let prompt = autofill_prompt(&request(), &[]);
        for key in review_core::FORM_FIELD_KEYS {
            assert!(prompt.contains(key), "prompt should mention {key}");
        }
        assert!(prompt.contains("\"form_type\": \"suitability\""));
    }

    #[test]
    fn excerpts_render_with_source_ids() {
        let excerpts = vec![(
            "reg-bi.pdf::chunk_3".to_string(),
            "Care obligation excerpt".to_string(),
        )];
        let prompt = autofill_prompt(&request(), &excerpts);
        assert!(prompt.contains("SOURCE_ID: reg-bi.pdf::chunk_3"));
        assert!(prompt.contains("EXCERPT: Care obligation excerpt"));
        assert!(!prompt.contains("(none)"));
    }

    #[test]
    fn no_excerpts_renders_none_marker() {
        let prompt = autofill_prompt(&request(), &[]);
        assert!(prompt.contains("POLICY EXCERPTS:\n(none)"));
    }

    #[test]
    fn missing_profile_renders_empty_object() {
        let mut req = request();
        req.client_profile = None;
        let prompt = autofill_prompt(&req, &[]);
        assert!(prompt.contains("client_profile: {}"));
    }

    #[test]
    fn reprint_prompt_quotes_previous_output() {
        let prompt = reprint_prompt("{\"partial\":");
        assert!(prompt.contains("PREVIOUS_OUTPUT"));
        assert!(prompt.contains("{\"partial\":"));
    }
}
