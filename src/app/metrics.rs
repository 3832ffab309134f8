//! Minimal request counters/histograms: a couple of process-wide
//! instruments recorded from the auction handler, exported over OTLP when
//! configured and otherwise simply inert.

use opentelemetry::metrics::{Counter, Histogram};
use opentelemetry::{KeyValue, global};
use std::sync::LazyLock;
use std::time::Duration;

static AUCTIONS_TOTAL: LazyLock<Counter<u64>> = LazyLock::new(|| {
    global::meter("nexus")
        .u64_counter("auctions")
        .with_description("Auctions completed, by outcome")
        .with_unit("1")
        .build()
});

static AUCTION_DURATION: LazyLock<Histogram<f64>> = LazyLock::new(|| {
    global::meter("nexus")
        .f64_histogram("auction.duration")
        .with_description("Auction wall-clock duration")
        .with_unit("s")
        .build()
});

pub fn record_auction(status_code: u16, bidder_count: usize, duration: Duration) {
    let attrs = [
        KeyValue::new("http.response.status_code", status_code as i64),
        KeyValue::new("bidder_count", bidder_count as i64),
    ];
    AUCTIONS_TOTAL.add(1, &attrs);
    AUCTION_DURATION.record(duration.as_secs_f64(), &attrs);
}
