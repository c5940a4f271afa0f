use std::sync::Mutex;

use async_trait::async_trait;
use freightdesk_core::{DotNumber, EligibilityStatus, McNumber};
use freightdesk_registry::{EligibilityResolver, RegistryApi, RegistryError};
use serde_json::{json, Value};

/// Scripted registry double: each endpoint replays a canned outcome and
/// every call is recorded so tests can assert on lookup order and
/// short-circuiting.
#[derive(Clone)]
enum Scripted {
    Payload(Value),
    Status(u16),
    Unauthorized,
}

impl Scripted {
    fn resolve(&self) -> Result<Value, RegistryError> {
        match self {
            Self::Payload(payload) => Ok(payload.clone()),
            Self::Status(status) => Err(RegistryError::UpstreamStatus { status: *status }),
            Self::Unauthorized => Err(RegistryError::Authentication),
        }
    }
}

struct ScriptedRegistry {
    docket: Scripted,
    carrier: Scripted,
    authority: Scripted,
    oos: Scripted,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedRegistry {
    fn new(docket: Scripted, carrier: Scripted, authority: Scripted, oos: Scripted) -> Self {
        Self { docket, carrier, authority, oos, calls: Mutex::new(Vec::new()) }
    }

    fn record(&self, endpoint: &'static str) {
        self.calls.lock().expect("call log lock").push(endpoint);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("call log lock").clone()
    }
}

#[async_trait]
impl RegistryApi for ScriptedRegistry {
    async fn docket_lookup(&self, _mc: &McNumber) -> Result<Value, RegistryError> {
        self.record("docket_lookup");
        self.docket.resolve()
    }

    async fn carrier_record(&self, _dot: &DotNumber) -> Result<Value, RegistryError> {
        self.record("carrier_record");
        self.carrier.resolve()
    }

    async fn authority_record(&self, _dot: &DotNumber) -> Result<Value, RegistryError> {
        self.record("authority_record");
        self.authority.resolve()
    }

    async fn oos_record(&self, _dot: &DotNumber) -> Result<Value, RegistryError> {
        self.record("oos_record");
        self.oos.resolve()
    }
}

fn docket_payload() -> Scripted {
    Scripted::Payload(json!({"content": [{"carrier": {"dotNumber": 3921117}}]}))
}

fn operating_carrier() -> Scripted {
    Scripted::Payload(json!({"carrier": {"allowToOperate": "Y", "outOfService": "N"}}))
}

fn active_authority() -> Scripted {
    Scripted::Payload(json!({"content": [
        {"commonAuthorityStatus": "ACTIVE", "authorizedForProperty": "Y"}
    ]}))
}

#[tokio::test]
async fn operating_carrier_with_active_authority_is_authorized() {
    let registry = ScriptedRegistry::new(
        docket_payload(),
        operating_carrier(),
        active_authority(),
        Scripted::Payload(json!({"oosDate": null})),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("MC-76667").await.expect("verify should answer");

    assert!(verdict.eligible);
    assert_eq!(verdict.status, EligibilityStatus::Authorized);
    assert_eq!(verdict.mc.as_str(), "76667");
    assert_eq!(verdict.dot_number.as_ref().map(|dot| dot.0.as_str()), Some("3921117"));
    assert!(verdict.evidence.docket_lookup.is_some());
    assert!(verdict.evidence.carrier.is_some());
    assert!(verdict.evidence.authority.is_some());
    assert!(verdict.evidence.oos.is_some());
}

#[tokio::test]
async fn out_of_service_flag_flips_the_verdict() {
    let registry = ScriptedRegistry::new(
        docket_payload(),
        Scripted::Payload(json!({"carrier": {"allowToOperate": "Y", "outOfService": "Y"}})),
        active_authority(),
        Scripted::Status(404),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("76667").await.expect("verify should answer");

    assert!(!verdict.eligible);
    assert_eq!(verdict.status, EligibilityStatus::OutOfService);
}

#[tokio::test]
async fn unresolved_docket_short_circuits_remaining_lookups() {
    let registry = ScriptedRegistry::new(
        Scripted::Payload(json!({"content": []})),
        operating_carrier(),
        active_authority(),
        Scripted::Payload(json!({})),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("999999").await.expect("verify should answer");

    assert!(!verdict.eligible);
    assert_eq!(verdict.status, EligibilityStatus::NotFound);
    assert!(verdict.dot_number.is_none());
    assert_eq!(resolver_calls(&resolver), vec!["docket_lookup"]);
}

#[tokio::test]
async fn docket_upstream_failure_degrades_to_not_found() {
    let registry = ScriptedRegistry::new(
        Scripted::Status(500),
        operating_carrier(),
        active_authority(),
        Scripted::Payload(json!({})),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("76667").await.expect("verify should answer");

    assert_eq!(verdict.status, EligibilityStatus::NotFound);
    assert!(verdict.evidence.docket_lookup.is_none());
}

#[tokio::test]
async fn authority_fetch_failure_degrades_to_unknown() {
    let registry = ScriptedRegistry::new(
        docket_payload(),
        operating_carrier(),
        Scripted::Status(503),
        Scripted::Payload(json!({})),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("76667").await.expect("verify should answer");

    assert!(!verdict.eligible);
    assert_eq!(verdict.status, EligibilityStatus::Unknown);
    assert_eq!(verdict.dot_number.as_ref().map(|dot| dot.0.as_str()), Some("3921117"));
    assert!(verdict.evidence.carrier.is_some());
}

#[tokio::test]
async fn oos_lookup_failure_is_swallowed() {
    let registry = ScriptedRegistry::new(
        docket_payload(),
        operating_carrier(),
        active_authority(),
        Scripted::Status(500),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("76667").await.expect("verify should answer");

    assert!(verdict.eligible);
    assert_eq!(verdict.status, EligibilityStatus::Authorized);
    assert!(verdict.evidence.oos.is_none());
}

#[tokio::test]
async fn authentication_failure_aborts_the_call() {
    let registry = ScriptedRegistry::new(
        Scripted::Unauthorized,
        operating_carrier(),
        active_authority(),
        Scripted::Payload(json!({})),
    );
    let resolver = EligibilityResolver::new(registry);

    let error = resolver.verify("76667").await.expect_err("credential rejection is fatal");
    assert!(matches!(error, RegistryError::Authentication));
}

#[tokio::test]
async fn carrier_without_active_authority_is_not_authorized() {
    let registry = ScriptedRegistry::new(
        docket_payload(),
        operating_carrier(),
        Scripted::Payload(json!([{"commonAuthorityStatus": "INACTIVE"}])),
        Scripted::Payload(json!({})),
    );
    let resolver = EligibilityResolver::new(registry);

    let verdict = resolver.verify("76667").await.expect("verify should answer");

    assert!(!verdict.eligible);
    assert_eq!(verdict.status, EligibilityStatus::NotAuthorized);
}

#[tokio::test]
async fn input_without_digits_is_rejected_before_any_lookup() {
    let registry = ScriptedRegistry::new(
        docket_payload(),
        operating_carrier(),
        active_authority(),
        Scripted::Payload(json!({})),
    );
    let resolver = EligibilityResolver::new(registry);

    let error = resolver.verify("MC-").await.expect_err("empty identifier must fail");
    assert!(matches!(error, RegistryError::Domain(_)));
    assert!(resolver_calls(&resolver).is_empty());
}

fn resolver_calls(resolver: &EligibilityResolver<ScriptedRegistry>) -> Vec<&'static str> {
    resolver.client().calls()
}
