use std::collections::HashMap;

use kyc_types::{DataRecord, FieldKind};

/// Read-only lookup of the canonical record behind a verified value.
///
/// Implementations are shared across concurrent verification calls and must
/// never mutate during a session.
pub trait RecordSource: Send + Sync {
    /// Returns `None` if no record exists for `value`.
    fn lookup(&self, kind: FieldKind, value: &str) -> Option<DataRecord>;
}

/// Fixed in-memory record table keyed by field kind and exact value.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecords {
    tables: HashMap<FieldKind, HashMap<String, DataRecord>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_record(mut self, kind: FieldKind, value: impl Into<String>, record: DataRecord) -> Self {
        self.tables
            .entry(kind)
            .or_default()
            .insert(value.into(), record);
        self
    }

    /// Total number of records across all kinds.
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The demo directory used by the simulated gateway.
    pub fn demo() -> Self {
        Self::new()
            .with_record(
                FieldKind::IdentityNumber,
                "234567890123",
                DataRecord::from_pairs([
                    ("name", "Asha Verma"),
                    ("date of birth", "1990-04-12"),
                    ("gender", "Female"),
                    ("address", "12 MG Road, Bengaluru 560001"),
                ]),
            )
            .with_record(
                FieldKind::IdentityNumber,
                "987654321098",
                DataRecord::from_pairs([
                    ("name", "Rohan Iyer"),
                    ("date of birth", "1985-11-02"),
                    ("gender", "Male"),
                    ("address", "4 Park Street, Kolkata 700016"),
                ]),
            )
            .with_record(
                FieldKind::TaxId,
                "ABCDE1234F",
                DataRecord::from_pairs([
                    ("name", "Asha Verma"),
                    ("date of birth", "1990-04-12"),
                    ("status", "Active"),
                ]),
            )
            .with_record(
                FieldKind::AccountNumber,
                "000123456789",
                DataRecord::from_pairs([
                    ("account holder", "Asha Verma"),
                    ("account type", "Savings"),
                ]),
            )
            .with_record(
                FieldKind::RoutingCode,
                "SBIN0001234",
                DataRecord::from_pairs([
                    ("bank", "State Bank of India"),
                    ("branch", "MG Road"),
                    ("city", "Bengaluru"),
                ]),
            )
            .with_record(
                FieldKind::RoutingCode,
                "HDFC0000123",
                DataRecord::from_pairs([
                    ("bank", "HDFC Bank"),
                    ("branch", "Park Street"),
                    ("city", "Kolkata"),
                ]),
            )
    }
}

impl RecordSource for InMemoryRecords {
    fn lookup(&self, kind: FieldKind, value: &str) -> Option<DataRecord> {
        self.tables.get(&kind)?.get(value).cloned()
    }
}
