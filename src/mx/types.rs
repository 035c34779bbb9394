#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Exchanges for one domain, preferred first. Resolved per top-level call.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailRoute {
    records: Vec<MxRecord>,
}

impl MailRoute {
    /// Stable sort by preference: equal preferences keep resolution order.
    /// Exact duplicates are dropped.
    pub fn from_records(mut records: Vec<MxRecord>) -> Self {
        records.sort_by_key(|r| r.preference);
        let mut out: Vec<MxRecord> = Vec::with_capacity(records.len());
        for record in records {
            if !out.contains(&record) {
                out.push(record);
            }
        }
        Self { records: out }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[MxRecord] {
        &self.records
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.exchange.as_str())
    }

    pub fn host_names(&self) -> Vec<String> {
        self.hosts().map(str::to_string).collect()
    }
}
