pub mod classifier;
pub mod edgar;
pub mod filings;
pub mod ledger;
pub mod notifier;
pub mod pipeline;
pub mod rates;
pub mod schedule;
pub mod traits;
pub mod types;

pub use classifier::{Classifier, GeminiClassifier, KeywordClassifier};
pub use edgar::{EdgarClient, EDGAR_CURRENT_FILINGS_URL};
pub use ledger::ProcessedLedger;
pub use notifier::{Notifier, TelegramNotifier};
pub use pipeline::{AlertPipeline, PipelineConfig, TickReport};
pub use rates::AaveRatesClient;
pub use schedule::RecurringSchedule;
pub use traits::{FilingFeed, RatesSource};
pub use types::*;
