//! The auction orchestrator: bidder selection, deadline-
//! bounded fan-out, winner selection, response assembly.

pub mod currency;
pub mod demand_client;

use crate::core::adapter::{AdapterError, ExtraRequestInfo};
use crate::core::openrtb::{Bid, BidRequest, BidResponse, SeatBid};
use crate::core::registry::BidderRegistry;
use currency::CurrencyConverter;
use demand_client::DemandClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn, Instrument};

/// Safety margin subtracted from the remaining budget before handing a
/// timeout to an individual bidder, so the orchestrator always has time
/// left to assemble the response.
pub const SAFETY_MARGIN: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct BidderOutcome {
    pub bidder_code: String,
    pub bids: Vec<crate::core::adapter::TypedBid>,
    /// The currency the adapter's `BidderResponse` actually reported its
    /// bids in (default "USD" when absent). Not the impression's floor
    /// currency, which says nothing about what a bidder returned.
    pub bid_currency: String,
    pub errors: Vec<String>,
    pub latency_ms: u64,
}

pub struct AuctionOptions {
    pub cooperative_sync: bool,
    pub debug: bool,
    pub server_max_tmax: Duration,
    /// Additional bidder codes suggested by the external identity-decisioning
    /// service, unioned with `imp[].ext.prebid.bidder` before selection.
    /// Advisory only — an empty vec changes nothing.
    pub suggested_bidders: Vec<String>,
}

impl Default for AuctionOptions {
    fn default() -> Self {
        Self {
            cooperative_sync: false,
            debug: false,
            server_max_tmax: Duration::from_millis(1000),
            suggested_bidders: Vec::new(),
        }
    }
}

pub struct AuctionOrchestrator {
    registry: Arc<BidderRegistry>,
    demand_client: DemandClient,
    currency: CurrencyConverter,
}

impl AuctionOrchestrator {
    pub fn new(registry: Arc<BidderRegistry>, demand_client: DemandClient) -> Self {
        Self {
            registry,
            demand_client,
            currency: CurrencyConverter::default(),
        }
    }

    pub fn with_currency_converter(mut self, currency: CurrencyConverter) -> Self {
        self.currency = currency;
        self
    }

    /// Step 1: `imp[].ext.prebid.bidder.*` keys, or every enabled adapter
    /// under cooperative mode when none were named, filtered by publisher
    /// and country policy.
    fn select_bidders(
        &self,
        req: &BidRequest,
        options: &AuctionOptions,
    ) -> Vec<Arc<crate::core::registry::RegisteredBidder>> {
        let mut requested: Vec<String> = req
            .imp
            .iter()
            .flat_map(|imp| imp.requested_bidders())
            .collect();
        if !requested.is_empty() {
            requested.extend(options.suggested_bidders.iter().cloned());
        }
        requested.sort();
        requested.dedup();

        let candidates: Vec<Arc<crate::core::registry::RegisteredBidder>> = if requested.is_empty()
        {
            if options.cooperative_sync {
                self.registry
                    .get_all()
                    .into_iter()
                    .filter(|b| b.config.is_enabled())
                    .collect()
            } else {
                Vec::new()
            }
        } else {
            requested
                .iter()
                .filter_map(|code| self.registry.get(code))
                .filter(|b| b.config.is_enabled())
                .collect()
        };

        let publisher_id = req.publisher_id();
        let country = req.country();

        candidates
            .into_iter()
            .filter(|b| {
                publisher_id
                    .as_deref()
                    .map(|pid| b.config.can_bid_for_publisher(pid))
                    .unwrap_or(true)
            })
            .filter(|b| {
                country
                    .as_deref()
                    .map(|cc| b.config.can_bid_for_country(cc))
                    .unwrap_or(true)
            })
            .collect()
    }

    /// Runs the full auction: selection, fan-out, aggregation, winner
    /// selection, response assembly.
    pub async fn run(&self, req: &BidRequest, options: AuctionOptions) -> BidResponse {
        let start = Instant::now();
        let deadline = self.deadline(req, &options);

        let bidders = self.select_bidders(req, &options);
        let response_currency = req
            .cur
            .as_ref()
            .and_then(|c| c.first().cloned())
            .unwrap_or_else(|| "USD".to_string());

        let outcomes = self.fan_out(req, &bidders, deadline).await;

        let (winners, debug_latencies, debug_errors) =
            self.select_winners(&outcomes, &response_currency);

        let mut seats: HashMap<String, Vec<Bid>> = HashMap::new();
        for (seat, bid) in winners {
            seats.entry(seat).or_default().push(bid);
        }

        let seatbid = seats
            .into_iter()
            .map(|(seat, bid)| SeatBid { seat, bid })
            .collect();

        let ext = if options.debug {
            Some(HashMap::from([
                (
                    "responsetimemillis".to_string(),
                    serde_json::to_value(debug_latencies).unwrap_or_default(),
                ),
                (
                    "errors".to_string(),
                    serde_json::to_value(debug_errors).unwrap_or_default(),
                ),
            ]))
        } else {
            None
        };

        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "auction complete");

        BidResponse {
            id: req.id.clone(),
            seatbid,
            cur: Some(response_currency),
            ext,
        }
    }

    fn deadline(&self, req: &BidRequest, options: &AuctionOptions) -> Duration {
        let requested = req
            .tmax
            .filter(|t| *t > 0)
            .map(|t| Duration::from_millis(t as u64));
        match requested {
            Some(requested) => requested.min(options.server_max_tmax),
            None => options.server_max_tmax,
        }
    }

    async fn fan_out(
        &self,
        req: &BidRequest,
        bidders: &[Arc<crate::core::registry::RegisteredBidder>],
        deadline: Duration,
    ) -> Vec<BidderOutcome> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<BidderOutcome>();

        for bidder in bidders {
            let bidder = Arc::clone(bidder);
            let req = req.clone();
            let demand_client = self.demand_client.clone();
            let tx = tx.clone();

            let per_bidder_timeout = deadline.saturating_sub(SAFETY_MARGIN).max(Duration::from_millis(1));
            let bidder_code = bidder.config.bidder_code.clone();
            let span = tracing::info_span!("bidder_callout", bidder = %bidder_code);

            tokio::spawn(
                async move {
                    let call_start = Instant::now();
                    let outcome = run_bidder(&bidder, &req, &demand_client, per_bidder_timeout).await;
                    let latency_ms = call_start.elapsed().as_millis() as u64;
                    let _ = tx.send(BidderOutcome {
                        bidder_code,
                        bids: outcome.0,
                        bid_currency: outcome.1,
                        errors: outcome.2,
                        latency_ms,
                    });
                }
                .instrument(span),
            );
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(bidders.len());
        let collected = tokio::time::timeout(deadline, async {
            while let Some(outcome) = rx.recv().await {
                outcomes.push(outcome);
            }
        })
        .await;

        if collected.is_err() {
            warn!(
                collected = outcomes.len(),
                expected = bidders.len(),
                "auction deadline hit before every bidder reported back"
            );
        }

        outcomes
    }

    /// Step 5: per-impression winner, tie-broken by deal presence then
    /// seat-name lexicographic order.
    fn select_winners(
        &self,
        outcomes: &[BidderOutcome],
        response_currency: &str,
    ) -> (Vec<(String, Bid)>, HashMap<String, u64>, HashMap<String, Vec<String>>) {
        let mut by_imp: HashMap<String, Vec<(String, Bid, f64)>> = HashMap::new();
        let mut latencies = HashMap::new();
        let mut errors: HashMap<String, Vec<String>> = HashMap::new();

        for outcome in outcomes {
            latencies.insert(outcome.bidder_code.clone(), outcome.latency_ms);
            if !outcome.errors.is_empty() {
                errors.insert(outcome.bidder_code.clone(), outcome.errors.clone());
            }
            for typed in &outcome.bids {
                let normalized =
                    self.currency
                        .convert(typed.bid.price, &outcome.bid_currency, response_currency);
                by_imp
                    .entry(typed.bid.impid.clone())
                    .or_default()
                    .push((outcome.bidder_code.clone(), typed.bid.clone(), normalized));
            }
        }

        let mut winners = Vec::new();
        for (_, mut candidates) in by_imp {
            candidates.sort_by(|(seat_a, bid_a, price_a), (seat_b, bid_b, price_b)| {
                price_b
                    .partial_cmp(price_a)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| bid_b.dealid.is_some().cmp(&bid_a.dealid.is_some()))
                    .then_with(|| seat_a.cmp(seat_b))
            });
            if let Some((seat, bid, _)) = candidates.into_iter().next() {
                winners.push((seat, bid));
            }
        }

        (winners, latencies, errors)
    }
}

async fn run_bidder(
    bidder: &crate::core::registry::RegisteredBidder,
    req: &BidRequest,
    demand_client: &DemandClient,
    timeout: Duration,
) -> (Vec<crate::core::adapter::TypedBid>, String, Vec<String>) {
    let extra = ExtraRequestInfo {
        publisher_id: req.publisher_id(),
    };
    let (requests, build_errors) = bidder.adapter.make_requests(req, &extra);
    let mut bids = Vec::new();
    let mut currency: Option<String> = None;
    let mut errors: Vec<String> = build_errors.iter().map(|e| e.to_string()).collect();

    for request in requests {
        match demand_client.send(&request, timeout).await {
            Ok(response) => {
                let (bidder_response, bid_errors) = bidder.adapter.make_bids(req, &response);
                errors.extend(bid_errors.iter().map(AdapterError::to_string));
                if let Some(bidder_response) = bidder_response {
                    if currency.is_none() {
                        currency = bidder_response.currency.clone();
                    }
                    bids.extend(bidder_response.bids);
                }
            }
            Err(e) => errors.push(format!("http call failed: {e}")),
        }
    }

    (bids, currency.unwrap_or_else(|| "USD".to_string()), errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bidder_config::{BidderConfig, BidderStatus};
    use crate::core::openrtb::Imp;

    fn registry_with(codes: &[&str]) -> Arc<BidderRegistry> {
        let registry = BidderRegistry::new();
        for code in codes {
            registry
                .register(BidderConfig {
                    bidder_code: (*code).into(),
                    status: BidderStatus::Active,
                    ..Default::default()
                })
                .unwrap();
        }
        Arc::new(registry)
    }

    fn orchestrator(codes: &[&str]) -> AuctionOrchestrator {
        AuctionOrchestrator::new(registry_with(codes), DemandClient::new().unwrap())
    }

    fn imp_with_bidder(bidder: &str) -> Imp {
        Imp {
            id: "imp1".into(),
            ext: Some(serde_json::json!({"prebid": {"bidder": {bidder: {}}}})),
            ..Default::default()
        }
    }

    #[test]
    fn select_bidders_honors_explicit_imp_ext() {
        let orch = orchestrator(&["acme", "other"]);
        let req = BidRequest {
            imp: vec![imp_with_bidder("acme")],
            ..Default::default()
        };
        let selected = orch.select_bidders(&req, &AuctionOptions::default());
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].config.bidder_code, "acme");
    }

    #[test]
    fn select_bidders_empty_without_cooperative_mode() {
        let orch = orchestrator(&["acme"]);
        let req = BidRequest {
            imp: vec![Imp {
                id: "imp1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(orch.select_bidders(&req, &AuctionOptions::default()).is_empty());
    }

    #[test]
    fn select_bidders_falls_back_to_all_enabled_under_cooperative_mode() {
        let orch = orchestrator(&["acme", "other"]);
        let req = BidRequest {
            imp: vec![Imp {
                id: "imp1".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = AuctionOptions {
            cooperative_sync: true,
            ..Default::default()
        };
        assert_eq!(orch.select_bidders(&req, &options).len(), 2);
    }

    #[test]
    fn winner_selection_prefers_higher_price_then_deal_then_seat_name() {
        let orch = orchestrator(&["zzz", "aaa"]);
        let outcomes = vec![
            BidderOutcome {
                bidder_code: "zzz".into(),
                bids: vec![crate::core::adapter::TypedBid {
                    bid: Bid {
                        id: "b1".into(),
                        impid: "imp1".into(),
                        price: 2.0,
                        ..Default::default()
                    },
                    bid_type: crate::core::adapter::BidType::Banner,
                    video: None,
                }],
                bid_currency: "USD".into(),
                errors: vec![],
                latency_ms: 10,
            },
            BidderOutcome {
                bidder_code: "aaa".into(),
                bids: vec![crate::core::adapter::TypedBid {
                    bid: Bid {
                        id: "b2".into(),
                        impid: "imp1".into(),
                        price: 2.0,
                        ..Default::default()
                    },
                    bid_type: crate::core::adapter::BidType::Banner,
                    video: None,
                }],
                bid_currency: "USD".into(),
                errors: vec![],
                latency_ms: 10,
            },
        ];
        let (winners, _, _) = orch.select_winners(&outcomes, "USD");
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].0, "aaa");
    }

    #[test]
    fn winner_selection_normalises_from_the_adapter_reported_currency() {
        let orch = orchestrator(&["eur_bidder", "usd_bidder"])
            .with_currency_converter(CurrencyConverter::default().with_rate("EUR", "USD", 1.1));
        let outcomes = vec![
            BidderOutcome {
                bidder_code: "eur_bidder".into(),
                bids: vec![crate::core::adapter::TypedBid {
                    bid: Bid {
                        id: "b1".into(),
                        impid: "imp1".into(),
                        price: 1.0,
                        ..Default::default()
                    },
                    bid_type: crate::core::adapter::BidType::Banner,
                    video: None,
                }],
                bid_currency: "EUR".into(),
                errors: vec![],
                latency_ms: 10,
            },
            BidderOutcome {
                bidder_code: "usd_bidder".into(),
                bids: vec![crate::core::adapter::TypedBid {
                    bid: Bid {
                        id: "b2".into(),
                        impid: "imp1".into(),
                        price: 1.05,
                        ..Default::default()
                    },
                    bid_type: crate::core::adapter::BidType::Banner,
                    video: None,
                }],
                bid_currency: "USD".into(),
                errors: vec![],
                latency_ms: 10,
            },
        ];
        // With EUR->USD conversion > 1.0, the nominally-smaller EUR bid
        // should win once normalised to the USD response currency. This
        // would pick the wrong winner if `bidfloorcur` (default "USD" for
        // both, since neither `Imp` sets it) were used instead of the
        // adapter-reported currency.
        let (winners, _, _) = orch.select_winners(&outcomes, "USD");
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].0, "eur_bidder");
    }
}
