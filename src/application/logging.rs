use tracing::info;

use crate::domain::{BalanceChanged, BalanceObserver, BankAccount, format_cents};

use super::LedgerError;

/// Balance observer that reports every change through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl BalanceObserver for LoggingObserver {
    fn on_balance_changed(
        &self,
        account: &BankAccount,
        event: &BalanceChanged,
    ) -> Result<(), LedgerError> {
        info!(
            account = %account.id,
            previous = %format_cents(event.previous),
            "Balance of {} changed: {}",
            account.name,
            format_cents(event.current)
        );
        Ok(())
    }
}

/// Install the global `tracing` subscriber with the given filter directive
/// (e.g. "finledger=info"). An unparsable directive falls back to info level.
pub fn init_tracing(directive: &str) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("finledger=info"));

    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
