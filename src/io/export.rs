use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::application::{LedgerError, LedgerService};
use crate::domain::{BankAccount, Category, Operation, format_cents};
use crate::storage::EntityRef;

use super::{IoOutcome, validate_path};

/// Every entity of the ledger, bucketed by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LedgerSnapshot {
    pub bank_accounts: Vec<BankAccount>,
    pub categories: Vec<Category>,
    pub operations: Vec<Operation>,
}

impl LedgerSnapshot {
    /// Collect the whole ledger by walking it entity by entity.
    pub fn collect(service: &LedgerService) -> Self {
        let mut snapshot = Self::default();
        service.for_each_entity(|entity| snapshot.push(entity));
        snapshot
    }

    /// Put one visited entity into its bucket.
    pub fn push(&mut self, entity: EntityRef<'_>) {
        match entity {
            EntityRef::Account(account) => self.bank_accounts.push(account.clone()),
            EntityRef::Category(category) => self.categories.push(category.clone()),
            EntityRef::Operation(operation) => self.operations.push(operation.clone()),
        }
    }
}

/// What an export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub accounts: usize,
    pub categories: usize,
    pub operations: usize,
}

/// Writes a full ledger snapshot to a file in one format.
pub trait DataExporter {
    /// Render the collected snapshot as file content.
    fn format_data(&self, snapshot: &LedgerSnapshot) -> Result<String, LedgerError>;

    /// Validate `path`, collect the ledger, format it and write the file.
    ///
    /// A bad path is logged and reported as `IoOutcome::Rejected`; nothing is
    /// written in that case.
    fn export(
        &self,
        service: &LedgerService,
        path: &Path,
    ) -> Result<IoOutcome<ExportSummary>, LedgerError> {
        if let Err(issue) = validate_path(path) {
            warn!(path = %path.display(), "Export skipped: {}", issue);
            return Ok(IoOutcome::Rejected(issue));
        }

        let snapshot = LedgerSnapshot::collect(service);
        let data = self.format_data(&snapshot)?;
        fs::write(path, data)?;
        info!("Exported to {}", path.display());

        Ok(IoOutcome::Completed(ExportSummary {
            path: path.to_path_buf(),
            accounts: snapshot.bank_accounts.len(),
            categories: snapshot.categories.len(),
            operations: snapshot.operations.len(),
        }))
    }
}

/// Three titled CSV sections separated by blank lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl DataExporter for CsvExporter {
    fn format_data(&self, snapshot: &LedgerSnapshot) -> Result<String, LedgerError> {
        let accounts = csv_section(
            "BankAccounts",
            &["Id", "Name", "Balance"],
            snapshot.bank_accounts.iter().map(|account| {
                vec![
                    account.id.to_string(),
                    account.name.clone(),
                    format_cents(account.balance()),
                ]
            }),
        )?;

        let categories = csv_section(
            "Categories",
            &["Id", "Type", "Name"],
            snapshot.categories.iter().map(|category| {
                vec![
                    category.id.to_string(),
                    category.entity_type.to_string(),
                    category.name.clone(),
                ]
            }),
        )?;

        let operations = csv_section(
            "Operations",
            &[
                "Id",
                "Type",
                "BankAccountId",
                "Amount",
                "Date",
                "Description",
                "CategoryId",
            ],
            snapshot.operations.iter().map(|op| {
                vec![
                    op.id.to_string(),
                    op.entity_type.to_string(),
                    op.bank_id.to_string(),
                    format_cents(op.amount),
                    op.date.format("%Y-%m-%d").to_string(),
                    op.description.clone(),
                    op.category.id.to_string(),
                ]
            }),
        )?;

        Ok([accounts, categories, operations].join("\n"))
    }
}

fn csv_section<I>(title: &str, header: &[&str], rows: I) -> Result<String, LedgerError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| LedgerError::Io(e.into_error()))?;
    Ok(format!("{}:\n{}", title, String::from_utf8_lossy(&body)))
}

/// One pretty-printed JSON document with an array per entity kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

impl DataExporter for JsonExporter {
    fn format_data(&self, snapshot: &LedgerSnapshot) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(snapshot)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::EntityType;

    fn sample_service() -> LedgerService {
        let mut service = LedgerService::default();
        let account = service.create_bank_account("Checking", 0).unwrap();
        let salary = service.create_category(EntityType::Income, "Salary");
        let cafe = service.create_category(EntityType::Expense, "Cafe");
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        service
            .create_operation_at(EntityType::Income, account.id, 10000, date, "March pay", &salary)
            .unwrap();
        service
            .create_operation_at(EntityType::Expense, account.id, 450, date, "Latte, large", &cafe)
            .unwrap();
        service
    }

    #[test]
    fn test_snapshot_collects_every_bucket() {
        let service = sample_service();
        let snapshot = LedgerSnapshot::collect(&service);

        assert_eq!(snapshot.bank_accounts.len(), 1);
        assert_eq!(snapshot.categories.len(), 2);
        assert_eq!(snapshot.operations.len(), 2);
    }

    #[test]
    fn test_csv_layout() {
        let service = sample_service();
        let snapshot = LedgerSnapshot::collect(&service);
        let csv = CsvExporter.format_data(&snapshot).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "BankAccounts:");
        assert_eq!(lines[1], "Id,Name,Balance");
        assert!(lines[2].ends_with(",Checking,95.50"));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "Categories:");
        assert_eq!(lines[5], "Id,Type,Name");
        assert!(lines[6].ends_with(",Income,Salary"));
        assert!(lines[7].ends_with(",Expense,Cafe"));
        assert_eq!(lines[8], "");
        assert_eq!(lines[9], "Operations:");
        assert_eq!(
            lines[10],
            "Id,Type,BankAccountId,Amount,Date,Description,CategoryId"
        );
        assert!(lines[11].contains(",100.00,2024-03-09,March pay,"));
        assert!(lines[12].contains(",4.50,2024-03-09,\"Latte, large\","));
    }

    #[test]
    fn test_json_layout() {
        let service = sample_service();
        let snapshot = LedgerSnapshot::collect(&service);
        let json = JsonExporter.format_data(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(json.contains("\n  \"BankAccounts\""));
        assert_eq!(value["BankAccounts"][0]["Balance"], 95.5);
        assert_eq!(value["Categories"][1]["EntityType"], "Expense");
        assert_eq!(value["Operations"][0]["Category"]["Name"], "Salary");
        assert_eq!(value["Operations"][1]["Description"], "Latte, large");
    }

    #[test]
    fn test_export_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ledger.json");
        let service = sample_service();

        let outcome = JsonExporter.export(&service, &path).unwrap();

        let summary = outcome.completed().unwrap();
        assert_eq!(summary.operations, 2);
        assert!(fs::read_to_string(&path).unwrap().contains("March pay"));
    }

    #[test]
    fn test_export_to_missing_directory_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("ledger.csv");

        let outcome = CsvExporter.export(&sample_service(), &path).unwrap();

        assert!(outcome.is_rejected());
        assert!(!path.exists());
    }
}
