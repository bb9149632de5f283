pub mod bot;
pub mod markup;
pub mod notifier;
pub mod rate_report;
pub mod rate_store;
pub mod scheduler;
pub mod signals;
pub mod sparkline;
pub mod telegram;

pub use bot::{Command, CommandBot};
pub use notifier::{JobOutcome, Notifier};
pub use rate_report::RateReportFormatter;
pub use rate_store::RateStore;
pub use scheduler::Scheduler;
pub use signals::{BuySignalAnalyzer, PriceHistoryProvider, SignalMessageFormatter};
pub use sparkline::SparklineGenerator;
pub use telegram::{ParseMode, TelegramSender};
