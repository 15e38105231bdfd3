use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::classifier::Classifier;
use crate::filings;
use crate::ledger::ProcessedLedger;
use crate::notifier::Notifier;
use crate::rates;
use crate::schedule::RecurringSchedule;
use crate::traits::{FilingFeed, RatesSource};
use crate::types::{Filing, FilingAlert};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sleep between filing polls.
    pub poll_interval: Duration,
    /// Minimum elapsed time between rates digests.
    pub rates_interval: chrono::Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(300),
            rates_interval: chrono::Duration::hours(24),
        }
    }
}

/// What happened to one tick, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub candidates: usize,
    pub already_seen: usize,
    /// Candidates fully evaluated and recorded this tick, relevant or not.
    pub recorded: usize,
    pub alerts_sent: usize,
    /// Candidates left unrecorded so a later tick retries them.
    pub retried: usize,
    /// Candidates with no derivable filing id.
    pub skipped: usize,
    pub rates_alert_sent: bool,
}

enum Outcome {
    AlreadySeen,
    Recorded { notified: bool },
    RetryLater,
    Skipped,
}

/// The poll-dedup-classify-notify loop.
///
/// Owns the ledger and talks to every other collaborator through its
/// capability trait, so ticks are testable with in-process fakes.
pub struct AlertPipeline {
    feed: Arc<dyn FilingFeed>,
    classifier: Arc<dyn Classifier>,
    notifier: Arc<dyn Notifier>,
    rates: Option<Arc<dyn RatesSource>>,
    ledger: ProcessedLedger,
    config: PipelineConfig,
}

impl AlertPipeline {
    pub fn new(
        feed: Arc<dyn FilingFeed>,
        classifier: Arc<dyn Classifier>,
        notifier: Arc<dyn Notifier>,
        ledger: ProcessedLedger,
        config: PipelineConfig,
    ) -> Self {
        Self {
            feed,
            classifier,
            notifier,
            rates: None,
            ledger,
            config,
        }
    }

    /// Enable the daily rates digest.
    pub fn with_rates_source(mut self, rates: Arc<dyn RatesSource>) -> Self {
        self.rates = Some(rates);
        self
    }

    pub fn ledger(&self) -> &ProcessedLedger {
        &self.ledger
    }

    /// Run the poll loop until the shutdown channel flips to `true`.
    ///
    /// The signal is observed during the inter-tick sleep; an in-flight tick
    /// runs to completion so no candidate is left between notify and record.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut schedule = RecurringSchedule::new(self.config.rates_interval);
        let mut ticker = interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            classifier = self.classifier.name(),
            "Starting alert pipeline"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_tick(&mut schedule, Utc::now()).await;
                }
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown too.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received; stopping pipeline");
                        break;
                    }
                }
            }
        }
    }

    /// One fetch-process pass. Collaborator failures are logged and contained
    /// per candidate; nothing here aborts the tick.
    pub async fn run_tick(
        &self,
        schedule: &mut RecurringSchedule,
        now: DateTime<Utc>,
    ) -> TickReport {
        let mut report = TickReport::default();

        report.rates_alert_sent = self.maybe_send_rates_alert(schedule, now).await;

        info!("Checking for new filings");
        let candidates = match self.feed.latest_filings().await {
            Ok(filings) => filings,
            Err(e) => {
                error!(error = %e, "Failed to fetch the filings feed; treating tick as empty");
                Vec::new()
            }
        };
        report.candidates = candidates.len();

        for filing in &candidates {
            match self.process_candidate(filing).await {
                Outcome::AlreadySeen => report.already_seen += 1,
                Outcome::Recorded { notified } => {
                    report.recorded += 1;
                    if notified {
                        report.alerts_sent += 1;
                    }
                }
                Outcome::RetryLater => report.retried += 1,
                Outcome::Skipped => report.skipped += 1,
            }
        }

        info!(
            candidates = report.candidates,
            recorded = report.recorded,
            alerts = report.alerts_sent,
            retried = report.retried,
            already_seen = report.already_seen,
            "Tick complete"
        );

        report
    }

    /// Dedup-check, fetch text, classify, notify, record for one filing.
    /// Every failure path decides between "record anyway", "retry later",
    /// and "skip", so one bad filing never blocks the rest of the tick.
    async fn process_candidate(&self, filing: &Filing) -> Outcome {
        let id = filings::extract_filing_id(&filing.link);
        if id.is_empty() {
            warn!(link = %filing.link, "Could not derive a filing id; skipping candidate");
            return Outcome::Skipped;
        }

        match self.ledger.contains(&id).await {
            Ok(true) => {
                debug!(filing_id = %id, "Skipping already processed filing");
                return Outcome::AlreadySeen;
            }
            Ok(false) => {}
            Err(e) => {
                // A storage failure is not a "not seen": surface it loudly,
                // then treat the filing as new so a degraded ledger cannot
                // silently drop alerts.
                error!(filing_id = %id, error = %e, "Ledger lookup failed; treating filing as new");
            }
        }

        info!("Processing new filing: {}", filing.title);

        let text = match self.feed.full_filing_text(&filing.link).await {
            Ok(text) => {
                if text.trim().is_empty() {
                    warn!(filing_id = %id, "Filing text was empty; will retry on a later tick");
                    return Outcome::RetryLater;
                }
                text
            }
            Err(e) => {
                warn!(
                    filing_id = %id,
                    error = %e,
                    "Could not retrieve filing text; will retry on a later tick"
                );
                return Outcome::RetryLater;
            }
        };

        let verdict = match self.classifier.classify(&text).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(
                    filing_id = %id,
                    classifier = self.classifier.name(),
                    error = %e,
                    "Classification failed; will retry on a later tick"
                );
                return Outcome::RetryLater;
            }
        };

        let mut notified = false;
        if verdict.relevant {
            let summary = verdict.summary.as_deref().unwrap_or("");
            let alert = FilingAlert::from_filing(filing, summary);
            match self.notifier.send(&alert).await {
                Ok(()) => notified = true,
                Err(e) => {
                    // Delivery is best-effort; the filing still gets recorded.
                    error!(filing_id = %id, error = %e, "Failed to deliver alert");
                }
            }
        }

        // The content has been fully evaluated: record the id whether or not
        // the filing was relevant, and whether or not delivery succeeded, so
        // it is never re-evaluated.
        if let Err(e) = self.ledger.record(&id).await {
            error!(filing_id = %id, error = %e, "Failed to record filing id; it may be reprocessed");
        }

        Outcome::Recorded { notified }
    }

    /// Fire the rates digest when due. Data availability, not delivery,
    /// advances the schedule; failures here never touch filing processing.
    async fn maybe_send_rates_alert(
        &self,
        schedule: &mut RecurringSchedule,
        now: DateTime<Utc>,
    ) -> bool {
        let source = match &self.rates {
            Some(source) => source,
            None => return false,
        };

        if !schedule.is_due(now) {
            return false;
        }

        info!("Rates digest is due; fetching rates");
        let rates = match source.stablecoin_rates().await {
            Ok(rates) => rates,
            Err(e) => {
                warn!(error = %e, "Rates fetch failed; digest stays due for the next tick");
                return false;
            }
        };

        if rates.is_empty() {
            warn!("No rates discoverable; digest stays due for the next tick");
            return false;
        }

        let message = rates::format_rates_message(&rates, source.source_url(), now);
        schedule.mark_fired(now);

        match self.notifier.send_text(&message).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to deliver rates digest");
                false
            }
        }
    }
}
