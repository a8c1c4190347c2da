//! Assisted parsing with a deterministic fallback.
//!
//! An external structuring service gets the raw utterance and may return
//! `{exercise, sets: [{set, reps, weight_kg}]}`. Any failure (timeout,
//! transport error, bad status, or a body that does not match that shape)
//! sends the utterance down the regex path instead, exactly once. Nothing
//! from the service escapes this module as an error.

use crate::config::AssistConfig;
use crate::engine;
use crate::extract;
use crate::sets::ExplicitSet;
use crate::vocabulary::canonicalize;
use crate::weight;
use crate::{Error, ParseOutcome, Result, SessionContext, WeightMeasurement};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("liftlog/", env!("CARGO_PKG_VERSION"));

/// Why the structuring service could not be used
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum UpstreamFailure {
    #[error("structuring service timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("structuring service returned status {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("structuring service not configured")]
    NotConfigured,
}

/// External structuring collaborator
///
/// Returns the raw response body; validation happens in [`validate_response`]
/// so every implementation is held to the same shape.
pub trait Structurer {
    fn structure(&self, utterance: &str) -> std::result::Result<String, UpstreamFailure>;
}

/// One set as returned by the structuring service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructuredSet {
    pub set: u32,
    pub reps: u32,
    pub weight_kg: f64,
}

/// A validated response from the structuring service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StructuredParse {
    pub exercise: String,
    pub sets: Vec<StructuredSet>,
}

/// Check a response body against the expected shape
pub fn validate_response(body: &str) -> std::result::Result<StructuredParse, UpstreamFailure> {
    let parsed: StructuredParse = serde_json::from_str(body)
        .map_err(|e| UpstreamFailure::InvalidResponse(e.to_string()))?;

    if parsed.exercise.trim().is_empty() {
        return Err(UpstreamFailure::InvalidResponse("empty exercise name".into()));
    }
    if parsed.sets.is_empty() {
        return Err(UpstreamFailure::InvalidResponse("no sets".into()));
    }
    if let Some(bad) = parsed.sets.iter().find(|s| !s.weight_kg.is_finite()) {
        return Err(UpstreamFailure::InvalidResponse(format!(
            "non-finite weight in set {}",
            bad.set
        )));
    }

    Ok(parsed)
}

/// Which path produced an outcome
#[derive(Clone, Debug, PartialEq)]
pub enum ParseSource {
    Assisted,
    Fallback { reason: UpstreamFailure },
}

/// An outcome and the path that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct AssistedOutcome {
    pub outcome: ParseOutcome,
    pub source: ParseSource,
}

impl AssistedOutcome {
    pub fn is_assisted(&self) -> bool {
        matches!(self.source, ParseSource::Assisted)
    }
}

/// Result of the single call to the structuring service
#[derive(Clone, Debug, PartialEq)]
pub enum StructuredAttempt {
    Parsed(StructuredParse),
    Failed(UpstreamFailure),
}

impl StructuredAttempt {
    /// Call the service once and validate what comes back
    pub fn attempt<S: Structurer + ?Sized>(structurer: &S, utterance: &str) -> Self {
        match structurer.structure(utterance).and_then(|body| validate_response(&body)) {
            Ok(parsed) => StructuredAttempt::Parsed(parsed),
            Err(failure) => StructuredAttempt::Failed(failure),
        }
    }

    /// Produce an outcome, falling back to the regex path on failure
    ///
    /// Continuity is always decided by the vocabulary and the context; the
    /// service only contributes the name of a new exercise and its sets.
    pub fn resolve(self, utterance: &str, ctx: &SessionContext) -> AssistedOutcome {
        match self {
            StructuredAttempt::Parsed(parsed) => {
                let spoken = weight::utterance_unit(utterance);
                let name = canonicalize(&parsed.exercise);

                let mut extraction = extract::extract(utterance);
                if let Some(recognized) = extraction.recognized.as_mut() {
                    recognized.name = name.clone();
                }
                extraction.label = name;
                extraction.explicit_sets = parsed
                    .sets
                    .iter()
                    .map(|s| ExplicitSet {
                        reps: s.reps,
                        weight: WeightMeasurement::from_kg(s.weight_kg, spoken),
                    })
                    .collect();

                AssistedOutcome {
                    outcome: engine::resolve_extraction(utterance, ctx, &extraction),
                    source: ParseSource::Assisted,
                }
            }
            StructuredAttempt::Failed(reason) => {
                tracing::warn!("Assisted parse failed ({}), using regex parser", reason);
                AssistedOutcome {
                    outcome: engine::parse_utterance(utterance, ctx),
                    source: ParseSource::Fallback { reason },
                }
            }
        }
    }
}

/// Parse with the structuring service, falling back on any failure
pub fn parse_with_assist<S: Structurer + ?Sized>(
    structurer: &S,
    utterance: &str,
    ctx: &SessionContext,
) -> AssistedOutcome {
    StructuredAttempt::attempt(structurer, utterance).resolve(utterance, ctx)
}

// ============================================================================
// HTTP client
// ============================================================================

#[derive(Serialize)]
struct StructureRequest<'a> {
    utterance: &'a str,
}

/// Blocking HTTP client for the structuring service
///
/// One request per utterance with a bounded timeout; no retries.
pub struct HttpStructurer {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpStructurer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    /// Build a client from configuration
    ///
    /// Returns `None` when assistance is disabled or no endpoint is set.
    pub fn from_config(config: &AssistConfig) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let Some(endpoint) = config.endpoint.as_deref() else {
            tracing::warn!("Assisted parsing enabled but no endpoint configured");
            return Ok(None);
        };

        let api_key = std::env::var(&config.api_key_env).ok();
        Self::new(endpoint, config.timeout(), api_key).map(Some)
    }
}

fn transport_failure(e: reqwest::Error) -> UpstreamFailure {
    if e.is_timeout() {
        UpstreamFailure::Timeout
    } else {
        UpstreamFailure::Transport(e.to_string())
    }
}

impl Structurer for HttpStructurer {
    fn structure(&self, utterance: &str) -> std::result::Result<String, UpstreamFailure> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&StructureRequest { utterance });
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!(endpoint = %self.endpoint, "Requesting assisted parse");

        let response = request.send().map_err(transport_failure)?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamFailure::Status(status.as_u16()));
        }

        response.text().map_err(transport_failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeightUnit;
    use std::cell::Cell;

    /// Canned structurer that counts calls
    struct Canned {
        reply: std::result::Result<String, UpstreamFailure>,
        calls: Cell<u32>,
    }

    impl Canned {
        fn ok(body: &str) -> Self {
            Self {
                reply: Ok(body.to_string()),
                calls: Cell::new(0),
            }
        }

        fn failing(failure: UpstreamFailure) -> Self {
            Self {
                reply: Err(failure),
                calls: Cell::new(0),
            }
        }
    }

    impl Structurer for Canned {
        fn structure(&self, _utterance: &str) -> std::result::Result<String, UpstreamFailure> {
            self.calls.set(self.calls.get() + 1);
            self.reply.clone()
        }
    }

    #[test]
    fn test_valid_response_used() {
        let canned = Canned::ok(
            r#"{"exercise":"Bench Press","sets":[{"set":1,"reps":10,"weight_kg":61.2},{"set":2,"reps":8,"weight_kg":61.2}]}"#,
        );
        let result = parse_with_assist(
            &canned,
            "135 pounds bench press 10 then 8",
            &SessionContext::default(),
        );

        assert!(result.is_assisted());
        assert_eq!(canned.calls.get(), 1);
        let outcome = result.outcome;
        assert_eq!(outcome.exercise(), "bench press");
        assert_eq!(outcome.sets().len(), 2);
        assert_eq!(outcome.sets()[0].weight.weight_kg, 61.0);
        assert_eq!(outcome.sets()[0].weight.weight_lbs, 135.0);
        assert_eq!(outcome.sets()[0].weight.weight_unit, WeightUnit::Lbs);
        assert_eq!(outcome.set_number, 2);
    }

    #[test]
    fn test_timeout_falls_back_once() {
        let canned = Canned::failing(UpstreamFailure::Timeout);
        let ctx = SessionContext::default();
        let utterance = "Bench press 3 sets of 10 reps at 60 kilograms";

        let result = parse_with_assist(&canned, utterance, &ctx);

        assert_eq!(canned.calls.get(), 1);
        assert_eq!(
            result.source,
            ParseSource::Fallback {
                reason: UpstreamFailure::Timeout
            }
        );
        assert_eq!(result.outcome, engine::parse_utterance(utterance, &ctx));
    }

    #[test]
    fn test_invalid_shapes_fall_back() {
        for body in [
            "not json",
            r#"{"exercise":"squat"}"#,
            r#"{"exercise":"","sets":[{"set":1,"reps":5,"weight_kg":100}]}"#,
            r#"{"exercise":"squat","sets":[]}"#,
            r#"{"exercise":"squat","sets":[{"set":1,"reps":5}]}"#,
            r#"{"exercise":"squat","sets":[{"set":1,"reps":5.5,"weight_kg":100}]}"#,
            r#"{"exercise":"squat","sets":[{"set":1,"reps":5,"weight_kg":100}],"notes":"x"}"#,
        ] {
            let canned = Canned::ok(body);
            let result = parse_with_assist(&canned, "squat 5 reps", &SessionContext::default());
            assert!(
                matches!(
                    result.source,
                    ParseSource::Fallback {
                        reason: UpstreamFailure::InvalidResponse(_)
                    }
                ),
                "{}",
                body
            );
            assert_eq!(result.outcome.exercise(), "squat");
        }
    }

    #[test]
    fn test_transport_and_status_failures_absorbed() {
        for failure in [
            UpstreamFailure::Transport("connection refused".into()),
            UpstreamFailure::Status(503),
            UpstreamFailure::NotConfigured,
        ] {
            let canned = Canned::failing(failure.clone());
            let result = parse_with_assist(&canned, "xyz qwerty", &SessionContext::default());
            assert_eq!(result.source, ParseSource::Fallback { reason: failure });
            assert_eq!(result.outcome.exercise(), "xyz qwerty");
        }
    }

    #[test]
    fn test_assisted_continuation_keeps_context() {
        let canned = Canned::ok(
            r#"{"exercise":"barbell bench press","sets":[{"set":1,"reps":8,"weight_kg":65}]}"#,
        );
        let ctx = SessionContext::new("bench press", 3);

        let outcome = parse_with_assist(&canned, "next set 8 reps 65 kg", &ctx).outcome;

        assert_eq!(outcome.exercise(), "bench press");
        assert!(outcome.is_continuation);
        assert_eq!(outcome.sets()[0].set, 4);
        assert_eq!(outcome.sets()[0].weight.weight_kg, 65.0);
    }

    #[test]
    fn test_assisted_name_for_new_exercise() {
        let canned = Canned::ok(
            r#"{"exercise":"Incline Dumbbell Press","sets":[{"set":1,"reps":10,"weight_kg":30}]}"#,
        );
        let ctx = SessionContext::new("squat", 5);

        let outcome = parse_with_assist(&canned, "incline dumbbell press 10 reps 30 kg", &ctx).outcome;

        assert_eq!(outcome.exercise(), "incline dumbbell press");
        assert!(outcome.is_new_exercise);
        assert_eq!(outcome.sets()[0].set, 1);
    }

    #[test]
    fn test_http_structurer_from_config() {
        let mut config = AssistConfig::default();
        assert!(HttpStructurer::from_config(&config).unwrap().is_none());

        config.enabled = true;
        assert!(HttpStructurer::from_config(&config).unwrap().is_none());

        config.endpoint = Some("http://127.0.0.1:9/structure".into());
        assert!(HttpStructurer::from_config(&config).unwrap().is_some());
    }

    #[test]
    fn test_unreachable_service_falls_back() {
        // Port 9 (discard) is closed on test machines; the request fails fast
        let structurer =
            HttpStructurer::new("http://127.0.0.1:9/structure", Duration::from_millis(500), None)
                .unwrap();
        let result = parse_with_assist(&structurer, "deadlift 5 reps 140 kg", &SessionContext::default());

        assert!(!result.is_assisted());
        assert_eq!(result.outcome.exercise(), "deadlift");
        assert_eq!(result.outcome.sets()[0].weight.weight_kg, 140.0);
    }
}
