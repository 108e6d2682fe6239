// 💸 UPI Transaction Log - transaction list → summary statistics
// Silent exclusion of invalid records, first-occurrence tie-breaks

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    /// Exact, case-sensitive match on `credit` / `debit`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "credit" => Some(TransactionType::Credit),
            "debit" => Some(TransactionType::Debit),
            _ => None,
        }
    }
}

/// One entry of a transaction log
///
/// `kind` stays a raw string so that logs with unknown types can be
/// represented; [`Transaction::is_valid`] decides what gets counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub to: String,
    pub category: String,
    /// Free-form, never validated
    pub date: String,
}

impl Transaction {
    pub fn new(id: &str, kind: &str, amount: f64, to: &str, category: &str, date: &str) -> Self {
        Transaction {
            id: id.to_string(),
            kind: kind.to_string(),
            amount,
            to: to.to_string(),
            category: category.to_string(),
            date: date.to_string(),
        }
    }

    pub fn transaction_type(&self) -> Option<TransactionType> {
        TransactionType::parse(&self.kind)
    }

    /// Positive amount and a known type
    pub fn is_valid(&self) -> bool {
        self.amount > 0.0 && self.transaction_type().is_some()
    }

    /// Shape check for untyped input
    ///
    /// Returns `None` unless the value is an object with a numeric
    /// `amount` and a string `type`. Other string members default to "".
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(Transaction {
            id: text("id"),
            kind: object.get("type")?.as_str()?.to_string(),
            amount: object.get("amount")?.as_f64()?,
            to: text("to"),
            category: text("category"),
            date: text("date"),
        })
    }
}

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Cut-offs for the two boolean flags of the summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryThresholds {
    /// `all_above_100` holds when every amount is strictly above this
    pub floor: f64,
    /// `has_large_transaction` holds when some amount reaches this
    pub large: f64,
}

impl Default for SummaryThresholds {
    fn default() -> Self {
        SummaryThresholds {
            floor: 100.0,
            large: 5000.0,
        }
    }
}

// ============================================================================
// CATEGORY BREAKDOWN
// ============================================================================

/// Category totals in first-seen order
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryBreakdown {
    totals: Vec<(String, f64)>,
}

impl CategoryBreakdown {
    pub fn new() -> Self {
        CategoryBreakdown::default()
    }

    /// Add to an existing category, or append a new one
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.totals.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += amount,
            None => self.totals.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&f64> {
        self.totals
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(name, total)| (name.as_str(), *total))
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.totals.iter().map(|(_, total)| *total)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl Serialize for CategoryBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.totals.len()))?;
        for (name, total) in &self.totals {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

struct BreakdownVisitor;

impl<'de> Visitor<'de> for BreakdownVisitor {
    type Value = CategoryBreakdown;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of category to amount")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut breakdown = CategoryBreakdown::new();
        while let Some((name, total)) = access.next_entry::<String, f64>()? {
            breakdown.add(&name, total);
        }
        Ok(breakdown)
    }
}

impl<'de> Deserialize<'de> for CategoryBreakdown {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(BreakdownVisitor)
    }
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_credit: f64,
    pub total_debit: f64,
    pub net_balance: f64,
    pub transaction_count: usize,
    pub avg_transaction: f64,
    pub highest_transaction: Transaction,
    pub category_breakdown: CategoryBreakdown,
    pub frequent_contact: String,
    /// Every amount above `SummaryThresholds::floor` (100 unless overridden)
    #[serde(rename = "allAbove100")]
    pub all_above_100: bool,
    /// Some amount at or above `SummaryThresholds::large` (5000 unless overridden)
    pub has_large_transaction: bool,
}

impl TransactionSummary {
    pub fn report(&self) -> String {
        let mut lines = vec![
            format!(
                "Transactions: {}, Credit: {:.2}, Debit: {:.2}, Net: {:.2}",
                self.transaction_count, self.total_credit, self.total_debit, self.net_balance
            ),
            format!(
                "Average: {:.0}, Highest: {} ({:.2})",
                self.avg_transaction, self.highest_transaction.id, self.highest_transaction.amount
            ),
            format!("Frequent contact: {}", self.frequent_contact),
        ];
        for (category, total) in self.category_breakdown.iter() {
            lines.push(format!("  {}: {:.2}", category, total));
        }
        lines.join("\n")
    }
}

// ============================================================================
// ANALYZER
// ============================================================================

/// Summarize a log with the default thresholds (100 / 5000)
pub fn analyze_upi_transactions(transactions: &[Transaction]) -> Option<TransactionSummary> {
    analyze_with_thresholds(transactions, SummaryThresholds::default())
}

/// Summarize an untyped value; anything but a non-empty array is rejected
///
/// Elements that fail [`Transaction::from_value`] are dropped like any
/// other invalid record.
pub fn analyze_upi_transactions_value(value: &Value) -> Option<TransactionSummary> {
    let items = value.as_array()?;
    if items.is_empty() {
        return None;
    }

    let transactions: Vec<Transaction> = items.iter().filter_map(Transaction::from_value).collect();
    if transactions.len() < items.len() {
        debug!(
            dropped = items.len() - transactions.len(),
            "dropped malformed transaction values"
        );
    }

    analyze_with_thresholds(&transactions, SummaryThresholds::default())
}

/// Summarize with custom cut-offs
///
/// The flag fields keep their names (`all_above_100`,
/// `has_large_transaction`) but test against `thresholds.floor` and
/// `thresholds.large`.
pub fn analyze_with_thresholds(
    transactions: &[Transaction],
    thresholds: SummaryThresholds,
) -> Option<TransactionSummary> {
    if transactions.is_empty() {
        return None;
    }

    let valid: Vec<&Transaction> = transactions
        .iter()
        .filter(|tx| {
            let ok = tx.is_valid();
            if !ok {
                debug!(id = %tx.id, kind = %tx.kind, amount = tx.amount, "skipping invalid transaction");
            }
            ok
        })
        .collect();

    // non-empty from here on
    let first = *valid.first()?;

    let mut total_credit = 0.0;
    let mut total_debit = 0.0;
    let mut highest = first;
    let mut category_breakdown = CategoryBreakdown::new();
    let mut contact_index: HashMap<&str, usize> = HashMap::new();
    let mut contact_counts: Vec<(&str, usize)> = Vec::new();
    let mut all_above_floor = true;
    let mut has_large = false;

    for &tx in &valid {
        match tx.transaction_type() {
            Some(TransactionType::Credit) => total_credit += tx.amount,
            Some(TransactionType::Debit) => total_debit += tx.amount,
            None => {}
        }

        // strictly greater keeps the earliest maximum
        if tx.amount > highest.amount {
            highest = tx;
        }

        category_breakdown.add(&tx.category, tx.amount);

        match contact_index.get(tx.to.as_str()) {
            Some(&i) => contact_counts[i].1 += 1,
            None => {
                contact_index.insert(tx.to.as_str(), contact_counts.len());
                contact_counts.push((tx.to.as_str(), 1));
            }
        }

        all_above_floor &= tx.amount > thresholds.floor;
        has_large |= tx.amount >= thresholds.large;
    }

    let mut frequent_contact = contact_counts[0];
    for &entry in &contact_counts[1..] {
        if entry.1 > frequent_contact.1 {
            frequent_contact = entry;
        }
    }

    let count = valid.len();
    let total = total_credit + total_debit;

    let summary = TransactionSummary {
        total_credit,
        total_debit,
        net_balance: total_credit - total_debit,
        transaction_count: count,
        avg_transaction: round_half_up(total / count as f64),
        highest_transaction: highest.clone(),
        category_breakdown,
        frequent_contact: frequent_contact.0.to_string(),
        all_above_100: all_above_floor,
        has_large_transaction: has_large,
    };

    debug!(
        count,
        total_credit = summary.total_credit,
        total_debit = summary.total_debit,
        "summarized transactions"
    );

    Some(summary)
}

/// Nearest integer, halves rounding up
///
/// Only called on positive averages, where `round` (halves away from
/// zero) is round-half-up. Adding 0.5 then flooring is off by one near
/// 0.5 and above 2^52.
fn round_half_up(value: f64) -> f64 {
    value.round()
}

// ============================================================================
// CSV INPUT
// ============================================================================

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    amount: String,
    #[serde(default)]
    to: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    date: String,
}

/// Read `id,type,amount,to,category,date` rows from an in-memory reader
///
/// Amounts that don't parse become NaN, which the analyzer drops.
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();

    for (line_num, result) in rdr.deserialize().enumerate() {
        let row: CsvRow = result.with_context(|| {
            format!("Failed to parse CSV line {}", line_num + 2)
        })?;

        transactions.push(Transaction {
            amount: row.amount.parse().unwrap_or(f64::NAN),
            id: row.id,
            kind: row.kind,
            to: row.to,
            category: row.category,
            date: row.date,
        });
    }

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn documented_log() -> Vec<Transaction> {
        vec![
            Transaction::new("T1", "credit", 5000.0, "Salary", "income", "2025-01-01"),
            Transaction::new("T2", "debit", 200.0, "Swiggy", "food", "2025-01-02"),
            Transaction::new("T3", "debit", 100.0, "Swiggy", "food", "2025-01-03"),
        ]
    }

    #[test]
    fn test_documented_summary() {
        let summary = analyze_upi_transactions(&documented_log()).unwrap();

        assert_eq!(summary.total_credit, 5000.0);
        assert_eq!(summary.total_debit, 300.0);
        assert_eq!(summary.net_balance, 4700.0);
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.avg_transaction, 1767.0);
        assert_eq!(summary.highest_transaction.id, "T1");
        assert_eq!(summary.category_breakdown.get("income"), Some(&5000.0));
        assert_eq!(summary.category_breakdown.get("food"), Some(&300.0));
        assert_eq!(summary.frequent_contact, "Swiggy");
        assert!(!summary.all_above_100);
        assert!(summary.has_large_transaction);
    }

    #[test]
    fn test_empty_log_is_absent() {
        assert!(analyze_upi_transactions(&[]).is_none());
    }

    #[test]
    fn test_all_invalid_is_absent() {
        let log = vec![
            Transaction::new("A", "credit", 0.0, "x", "c", ""),
            Transaction::new("B", "debit", -50.0, "x", "c", ""),
            Transaction::new("C", "credit", f64::NAN, "x", "c", ""),
            Transaction::new("D", "Credit", 500.0, "x", "c", ""),
            Transaction::new("E", "refund", 500.0, "x", "c", ""),
        ];
        assert!(analyze_upi_transactions(&log).is_none());
    }

    #[test]
    fn test_invalid_records_are_skipped() {
        let mut log = documented_log();
        log.push(Transaction::new("T4", "DEBIT", 9000.0, "Zomato", "food", ""));
        log.push(Transaction::new("T5", "debit", -10.0, "Zomato", "food", ""));

        let summary = analyze_upi_transactions(&log).unwrap();
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.highest_transaction.id, "T1");
        assert_eq!(summary.category_breakdown.get("food"), Some(&300.0));
    }

    #[test]
    fn test_highest_tie_keeps_first() {
        let log = vec![
            Transaction::new("A", "debit", 50.0, "x", "c", ""),
            Transaction::new("B", "debit", 700.0, "y", "c", ""),
            Transaction::new("C", "credit", 700.0, "z", "c", ""),
        ];
        let summary = analyze_upi_transactions(&log).unwrap();
        assert_eq!(summary.highest_transaction.id, "B");
    }

    #[test]
    fn test_frequent_contact_tie_keeps_first_seen() {
        let log = vec![
            Transaction::new("A", "debit", 150.0, "Ola", "travel", ""),
            Transaction::new("B", "debit", 150.0, "Uber", "travel", ""),
            Transaction::new("C", "debit", 150.0, "Uber", "travel", ""),
            Transaction::new("D", "debit", 150.0, "Ola", "travel", ""),
        ];
        let summary = analyze_upi_transactions(&log).unwrap();
        assert_eq!(summary.frequent_contact, "Ola");
        assert!(summary.all_above_100);
        assert!(!summary.has_large_transaction);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let log = vec![
            Transaction::new("A", "debit", 1.0, "x", "c", ""),
            Transaction::new("B", "debit", 2.0, "x", "c", ""),
        ];
        assert_eq!(analyze_upi_transactions(&log).unwrap().avg_transaction, 2.0);
    }

    #[test]
    fn test_breakdown_adds_credits_and_debits() {
        let log = vec![
            Transaction::new("A", "credit", 400.0, "x", "rent", ""),
            Transaction::new("B", "debit", 250.0, "y", "rent", ""),
        ];
        let summary = analyze_upi_transactions(&log).unwrap();
        assert_eq!(summary.category_breakdown.get("rent"), Some(&650.0));
        assert_eq!(summary.net_balance, 150.0);
    }

    #[test]
    fn test_average_rounding_at_float_edges() {
        let just_below_half = vec![Transaction::new("A", "debit", 0.49999999999999994, "x", "c", "")];
        assert_eq!(analyze_upi_transactions(&just_below_half).unwrap().avg_transaction, 0.0);

        let above_2_52 = vec![Transaction::new("A", "credit", 4503599627370497.0, "x", "c", "")];
        assert_eq!(
            analyze_upi_transactions(&above_2_52).unwrap().avg_transaction,
            4503599627370497.0
        );

        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(1766.6666666666667), 1767.0);
    }

    #[test]
    fn test_breakdown_keeps_first_seen_order() {
        let summary = analyze_upi_transactions(&documented_log()).unwrap();
        assert_eq!(
            serde_json::to_string(&summary.category_breakdown).unwrap(),
            r#"{"income":5000.0,"food":300.0}"#
        );

        let names: Vec<&str> = summary.category_breakdown.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["income", "food"]);
        assert_eq!(summary.category_breakdown.len(), 2);
    }

    #[test]
    fn test_summary_json_round_trip_keeps_breakdown() {
        let summary = analyze_upi_transactions(&documented_log()).unwrap();
        let json = serde_json::to_string(&summary).unwrap();
        let back: TransactionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = SummaryThresholds { floor: 50.0, large: 150.0 };
        let summary = analyze_with_thresholds(&documented_log(), thresholds).unwrap();
        assert!(summary.all_above_100);
        assert!(summary.has_large_transaction);
    }

    #[test]
    fn test_value_input() {
        assert!(analyze_upi_transactions_value(&json!([])).is_none());
        assert!(analyze_upi_transactions_value(&json!({"id": "T1"})).is_none());
        assert!(analyze_upi_transactions_value(&Value::Null).is_none());

        let value = json!([
            { "id": "T1", "type": "credit", "amount": 5000, "to": "Salary", "category": "income", "date": "2025-01-01" },
            { "id": "T2", "type": "debit", "amount": "200", "to": "Swiggy", "category": "food" },
            null,
            { "id": "T3", "type": "debit", "amount": 100, "to": "Swiggy", "category": "food" }
        ]);
        let summary = analyze_upi_transactions_value(&value).unwrap();
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.total_debit, 100.0);
        assert_eq!(summary.frequent_contact, "Salary");
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = analyze_upi_transactions(&documented_log()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["allAbove100"], false);
        assert_eq!(json["hasLargeTransaction"], true);
        assert_eq!(json["highestTransaction"]["type"], "credit");
        assert_eq!(json["frequentContact"], "Swiggy");
    }

    #[test]
    fn test_read_transactions_csv() {
        let csv = "id,type,amount,to,category,date\n\
                   T1,credit,5000,Salary,income,2025-01-01\n\
                   T2,debit,abc,Swiggy,food,2025-01-02\n\
                   T3, debit ,100,Swiggy,food,2025-01-03\n";
        let log = read_transactions_csv(csv.as_bytes()).unwrap();
        assert_eq!(log.len(), 3);
        assert!(log[1].amount.is_nan());
        assert_eq!(log[2].kind, "debit");

        let summary = analyze_upi_transactions(&log).unwrap();
        assert_eq!(summary.transaction_count, 2);
    }

    #[test]
    fn test_report_mentions_totals() {
        let report = analyze_upi_transactions(&documented_log()).unwrap().report();
        assert!(report.contains("Transactions: 3"));
        assert!(report.contains("Frequent contact: Swiggy"));
        assert!(report.contains("food: 300.00"));
    }
}
