use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::application::{CreateAccount, LedgerError, LedgerService, Timed};
use crate::domain::{
    AccountId, BankAccount, Category, Cents, EntityType, Operation, format_cents, parse_cents,
};

use super::{IoOutcome, LedgerSnapshot, validate_path};

/// One flat input row: field name -> raw text.
pub type Record = HashMap<String, String>;

/// Records parsed from a file, ready to be applied to a ledger.
#[derive(Debug, Clone, Default)]
pub struct ParsedData {
    pub records: Vec<Record>,
    /// Rows dropped while parsing (e.g. wrong field count)
    pub skipped: usize,
    /// Accounts to ensure even when no record mentions them, with the balance
    /// they held before any of the records
    pub accounts: Vec<(String, Cents)>,
    /// Categories to ensure even when no record mentions them
    pub categories: Vec<(EntityType, String)>,
}

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred while applying a single record
#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    /// 1-based position of the record among the parsed records
    pub record: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Reads a ledger file and merges its records into an existing ledger.
pub trait DataImporter {
    /// Turn file content into flat records.
    fn parse_data(&self, content: &str) -> Result<ParsedData, LedgerError>;

    /// Validate `path`, read it, parse it and apply every record.
    ///
    /// A bad path is logged and reported as `IoOutcome::Rejected` without
    /// touching the file system. A record that fails is logged and skipped.
    fn import(
        &self,
        path: &Path,
        service: &mut LedgerService,
    ) -> Result<IoOutcome<ImportResult>, LedgerError> {
        if let Err(issue) = validate_path(path) {
            warn!(path = %path.display(), "Import skipped: {}", issue);
            return Ok(IoOutcome::Rejected(issue));
        }

        let content = fs::read_to_string(path)?;
        let parsed = self.parse_data(&content)?;
        let result = process_records(parsed, service);
        info!(
            imported = result.imported,
            skipped = result.skipped,
            failed = result.errors.len(),
            "Imported from {}",
            path.display()
        );

        Ok(IoOutcome::Completed(result))
    }
}

/// Apply parsed records one by one. Failures never stop the batch.
pub fn process_records(parsed: ParsedData, service: &mut LedgerService) -> ImportResult {
    let mut result = ImportResult {
        skipped: parsed.skipped,
        ..ImportResult::default()
    };

    for (name, opening) in &parsed.accounts {
        if let Err(e) = ensure_account(service, name, *opening) {
            warn!(account = %name, "Could not create account: {}", e);
        }
    }
    for (entity_type, name) in &parsed.categories {
        ensure_category(service, name, *entity_type);
    }

    for (index, record) in parsed.records.iter().enumerate() {
        match import_record(record, service) {
            Ok(()) => result.imported += 1,
            Err((field, error)) => {
                warn!(record = index + 1, field = ?field, "Skipping record: {}", error);
                result.errors.push(ImportError {
                    record: index + 1,
                    field,
                    error,
                });
            }
        }
    }

    result
}

type RecordFailure = (Option<String>, String);

fn import_record(record: &Record, service: &mut LedgerService) -> Result<(), RecordFailure> {
    let entity_type = EntityType::from_label(required(record, "Type")?);

    let account_name = required(record, "AccountName")?;
    let account_id = ensure_account(service, account_name, 0).map_err(|e| (None, e.to_string()))?;

    let amount = parse_cents(required(record, "Amount")?)
        .map_err(|e| (Some("Amount".to_string()), e.to_string()))?;
    let date = parse_date(required(record, "Date")?)
        .map_err(|e| (Some("Date".to_string()), e))?;
    let description = record.get("Description").map(String::as_str).unwrap_or("");

    let category_name = required(record, "CategoryName")?;
    let category_type = EntityType::from_label(required(record, "CategoryType")?);
    let category = ensure_category(service, category_name, category_type);

    service
        .create_operation_at(entity_type, account_id, amount, date, description, &category)
        .map_err(|e| (None, e.to_string()))?;
    Ok(())
}

fn required<'a>(record: &'a Record, field: &str) -> Result<&'a str, RecordFailure> {
    record
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| (Some(field.to_string()), format!("missing field '{}'", field)))
}

/// Find an account by name or create it seeded with `opening`.
fn ensure_account(
    service: &mut LedgerService,
    name: &str,
    opening: Cents,
) -> Result<AccountId, LedgerError> {
    if let Some(account) = service.find_bank_account_by_name(name) {
        return Ok(account.id);
    }
    let account = service.execute(&Timed::new(CreateAccount::new(name, opening)))?;
    Ok(account.id)
}

fn ensure_category(service: &mut LedgerService, name: &str, entity_type: EntityType) -> Category {
    match service.find_category(name, entity_type) {
        Some(category) => category.clone(),
        None => service.create_category(entity_type, name),
    }
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS` and plain `YYYY-MM-DD`.
fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(format!("invalid date '{}'", s))
}

/// Header line followed by comma-separated value lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvImporter;

impl DataImporter for CsvImporter {
    fn parse_data(&self, content: &str) -> Result<ParsedData, LedgerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut parsed = ParsedData::default();
        let mut header: Option<Vec<String>> = None;

        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Unreadable CSV row: {}", e);
                    parsed.skipped += 1;
                    continue;
                }
            };
            if row.iter().all(str::is_empty) {
                continue;
            }

            match &header {
                None => header = Some(row.iter().map(str::to_string).collect()),
                Some(fields) if fields.len() != row.len() => parsed.skipped += 1,
                Some(fields) => parsed.records.push(
                    fields
                        .iter()
                        .cloned()
                        .zip(row.iter().map(str::to_string))
                        .collect(),
                ),
            }
        }

        Ok(parsed)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDocument {
    Records(Vec<serde_json::Map<String, Value>>),
    Snapshot(LedgerSnapshot),
}

/// A JSON array of flat objects, or a document written by `JsonExporter`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonImporter;

impl DataImporter for JsonImporter {
    fn parse_data(&self, content: &str) -> Result<ParsedData, LedgerError> {
        match serde_json::from_str(content)? {
            JsonDocument::Records(rows) => Ok(ParsedData {
                records: rows.into_iter().map(flatten_object).collect(),
                ..ParsedData::default()
            }),
            JsonDocument::Snapshot(snapshot) => Ok(records_from_snapshot(snapshot)),
        }
    }
}

fn flatten_object(object: serde_json::Map<String, Value>) -> Record {
    object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}

fn records_from_snapshot(snapshot: LedgerSnapshot) -> ParsedData {
    let names: HashMap<AccountId, &str> = snapshot
        .bank_accounts
        .iter()
        .map(|a| (a.id, a.name.as_str()))
        .collect();

    let mut parsed = ParsedData {
        accounts: snapshot
            .bank_accounts
            .iter()
            .map(|a| (a.name.clone(), opening_balance(a, &snapshot.operations)))
            .collect(),
        categories: snapshot
            .categories
            .iter()
            .map(|c| (c.entity_type, c.name.clone()))
            .collect(),
        ..ParsedData::default()
    };

    for op in &snapshot.operations {
        let Some(account_name) = names.get(&op.bank_id) else {
            parsed.skipped += 1;
            continue;
        };
        parsed.records.push(Record::from([
            ("Type".to_string(), op.entity_type.to_string()),
            ("AccountName".to_string(), account_name.to_string()),
            ("Amount".to_string(), format_cents(op.amount)),
            ("Date".to_string(), op.date.to_rfc3339()),
            ("Description".to_string(), op.description.clone()),
            ("CategoryName".to_string(), op.category.name.clone()),
            ("CategoryType".to_string(), op.category.entity_type.to_string()),
        ]));
    }

    parsed
}

/// Balance an exported account held before its exported operations, so that
/// replaying them ends on the exported balance.
fn opening_balance(account: &BankAccount, operations: &[Operation]) -> Cents {
    operations
        .iter()
        .filter(|o| o.bank_id == account.id)
        .try_fold(account.balance(), |balance, o| {
            balance.checked_sub(o.signed_amount())
        })
        .unwrap_or_else(|| {
            warn!(account = %account.name, "Opening balance out of range, starting from zero");
            0
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Type,AccountName,Amount,Date,Description,CategoryName,CategoryType";

    #[test]
    fn test_csv_parse_maps_header_to_values() {
        let content = format!(
            "{}\n income , Checking , 100.50 , 2024-01-05 , Pay , Salary , Income \n",
            HEADER
        );
        let parsed = CsvImporter.parse_data(&content).unwrap();

        assert_eq!(parsed.records.len(), 1);
        let record = &parsed.records[0];
        assert_eq!(record["Type"], "income");
        assert_eq!(record["AccountName"], "Checking");
        assert_eq!(record["Amount"], "100.50");
        assert_eq!(record["CategoryType"], "Income");
    }

    #[test]
    fn test_csv_parse_skips_rows_with_wrong_field_count() {
        let content = format!(
            "\n{}\nExpense,Checking,5,2024-01-05,Coffee,Cafe\n\nExpense,Checking,5,2024-01-05,Coffee,Cafe,Expense\n",
            HEADER
        );
        let parsed = CsvImporter.parse_data(&content).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_csv_parse_header_only() {
        let parsed = CsvImporter.parse_data(HEADER).unwrap();
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_json_parse_flat_records() {
        let content = r#"[
            {"Type": "Income", "AccountName": "Checking", "Amount": 12.5, "Date": "2024-01-05",
             "CategoryName": "Salary", "CategoryType": "Income", "Description": null}
        ]"#;
        let parsed = JsonImporter.parse_data(content).unwrap();

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0]["Amount"], "12.5");
        assert!(!parsed.records[0].contains_key("Description"));
    }

    #[test]
    fn test_json_parse_rejects_garbage() {
        assert!(matches!(
            JsonImporter.parse_data("{not json"),
            Err(LedgerError::Json(_))
        ));
    }

    #[test]
    fn test_process_records_is_best_effort() {
        let mut service = LedgerService::default();
        let good = Record::from([
            ("Type".to_string(), "INCOME".to_string()),
            ("AccountName".to_string(), "Checking".to_string()),
            ("Amount".to_string(), "20".to_string()),
            ("Date".to_string(), "2024-02-01".to_string()),
            ("CategoryName".to_string(), "Salary".to_string()),
            ("CategoryType".to_string(), "income".to_string()),
        ]);
        let mut bad_amount = good.clone();
        bad_amount.insert("Amount".to_string(), "twenty".to_string());
        let mut no_category = good.clone();
        no_category.remove("CategoryName");

        let result = process_records(
            ParsedData {
                records: vec![bad_amount, good, no_category],
                ..ParsedData::default()
            },
            &mut service,
        );

        assert_eq!(result.imported, 1);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].record, 1);
        assert_eq!(result.errors[0].field.as_deref(), Some("Amount"));
        assert_eq!(result.errors[1].field.as_deref(), Some("CategoryName"));

        let account = service.find_bank_account_by_name("Checking").unwrap();
        assert_eq!(account.balance(), 2000);
        assert_eq!(service.operations()[0].date.format("%Y-%m-%d").to_string(), "2024-02-01");
    }

    #[test]
    fn test_snapshot_accounts_carry_opening_balance() {
        let mut exported = LedgerService::default();
        let account = exported.create_bank_account("Checking", 10000).unwrap();
        let rent = exported.create_category(EntityType::Expense, "Rent");
        let salary = exported.create_category(EntityType::Income, "Salary");
        exported
            .create_operation(EntityType::Expense, account.id, 8000, "", &rent)
            .unwrap();
        exported
            .create_operation(EntityType::Income, account.id, 500, "", &salary)
            .unwrap();

        let parsed = records_from_snapshot(LedgerSnapshot::collect(&exported));

        assert_eq!(parsed.accounts, vec![("Checking".to_string(), 10000)]);
        assert_eq!(parsed.records.len(), 2);
    }

    #[test]
    fn test_process_records_reuses_accounts_and_categories() {
        let mut service = LedgerService::default();
        let record = |kind: &str, amount: &str, category: &str| {
            Record::from([
                ("Type".to_string(), kind.to_string()),
                ("AccountName".to_string(), "Checking".to_string()),
                ("Amount".to_string(), amount.to_string()),
                ("Date".to_string(), "2024-02-01T10:00:00Z".to_string()),
                ("CategoryName".to_string(), category.to_string()),
                ("CategoryType".to_string(), kind.to_string()),
            ])
        };

        let result = process_records(
            ParsedData {
                records: vec![
                    record("income", "100", "Salary"),
                    record("expense", "30", "Food"),
                    record("expense", "20", "Food"),
                ],
                ..ParsedData::default()
            },
            &mut service,
        );

        assert_eq!(result.imported, 3);
        assert_eq!(service.bank_accounts().len(), 1);
        assert_eq!(service.categories().len(), 2);
        assert_eq!(service.bank_accounts()[0].balance(), 5000);
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("2024-01-05").is_ok());
        assert!(parse_date("2024-01-05 13:45:00").is_ok());
        assert!(parse_date("2024-01-05T13:45:00+02:00").is_ok());
        assert!(parse_date("05/01/2024").is_err());
    }
}
