use clap::Args;
use freightdesk_core::config::{AppConfig, LoadOptions};
use freightdesk_core::{
    evaluate_round, AuditSink, CallCategory, CallEvent, EventOutcome, LoadFacts, RoundDecision,
    RoundInput, TracingAuditSink,
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::CommandResult;

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    #[arg(long)]
    pub load_id: String,
    #[arg(long, help = "Listed (loadboard) rate")]
    pub listed: Decimal,
    #[arg(long, help = "The carrier's current ask")]
    pub ask: Decimal,
    #[arg(long, help = "Offer quoted in the previous round; defaults to the listed rate")]
    pub prior_offer: Option<Decimal>,
    #[arg(long, default_value_t = 1)]
    pub round: u32,
    #[arg(long)]
    pub miles: Option<u32>,
    #[arg(long)]
    pub equipment: Option<String>,
    #[arg(long, help = "Call session id for audit correlation")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct EvaluateReport {
    command: &'static str,
    status: &'static str,
    load_id: String,
    round: u32,
    decision: RoundDecision,
}

pub fn run(args: &EvaluateArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("evaluate", "config_validation", error.to_string(), 2)
        }
    };
    super::init_logging(&config);

    let mut facts = LoadFacts::new(args.listed);
    facts.distance_miles = args.miles;
    facts.equipment = super::parse_equipment(args.equipment.as_deref());

    let input = RoundInput {
        load_id: args.load_id.clone(),
        round: args.round,
        carrier_ask: args.ask,
        prior_offer: args.prior_offer.unwrap_or(args.listed),
        facts,
    };

    let decision =
        match evaluate_round(&input, &config.pricing.cap, &config.pricing.negotiation) {
            Ok(decision) => decision,
            Err(error) => {
                return CommandResult::failure("evaluate", "invalid_input", error.to_string(), 2)
            }
        };

    TracingAuditSink.emit(
        CallEvent::record(
            "negotiation.round",
            CallCategory::Negotiation,
            "negotiation-engine",
            EventOutcome::Success,
        )
        .in_session(args.session_id.clone())
        .correlated(Uuid::new_v4().to_string())
        .with_metadata("load_id", input.load_id.as_str())
        .with_metadata("round", input.round.to_string())
        .with_metadata("carrier_ask", input.carrier_ask.to_string())
        .with_metadata("action", decision.action.as_str())
        .with_metadata("rationale", decision.rationale.as_str())
        .with_metadata("next_offer", decision.next_offer.to_string())
        .with_metadata("cap_rate", decision.cap_rate.to_string()),
    );

    CommandResult::data(
        0,
        &EvaluateReport {
            command: "evaluate",
            status: "ok",
            load_id: input.load_id.clone(),
            round: input.round,
            decision,
        },
    )
}
