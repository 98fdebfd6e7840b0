use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Laboratory {
    pub id: u32,
    pub name: String,
}

/// One laboratory order. Records are never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub date: NaiveDate,
    pub order_number: u32,
    pub patient: Patient,
    pub laboratory: Laboratory,
    pub delivery_date: NaiveDate,
    pub status: String,
}

/// Immutable in-memory list of records, created once per view session.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

// (date, order, patient id, first, last, lab id, lab name, delivery, status)
type SampleRow = (
    (i32, u32, u32),
    u32,
    u32,
    &'static str,
    &'static str,
    u32,
    &'static str,
    (i32, u32, u32),
    &'static str,
);

const SAMPLE: [SampleRow; 4] = [
    ((2022, 1, 1), 1, 1, "John", "Doe", 1, "Lab 1", (2022, 11, 11), "In Progress"),
    ((2022, 10, 3), 2, 2, "Jane", "Doe", 2, "Lab 2", (2022, 12, 11), "In Progress"),
    ((2022, 9, 8), 3, 3, "Max", "Mustermann", 3, "Lab 3", (2022, 11, 9), "Done"),
    ((2022, 3, 1), 4, 4, "Marta", "Musterfrau", 4, "Lab 4", (2022, 4, 5), "Cancelled"),
];

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The fixed four order mock dataset.
    pub fn sample() -> Self {
        let records = SAMPLE
            .iter()
            .map(
                |&(date, order_number, pid, first, last, lid, lab, delivery, status)| Record {
                    date: ymd(date),
                    order_number,
                    patient: Patient {
                        id: pid,
                        first_name: first.to_string(),
                        last_name: last.to_string(),
                    },
                    laboratory: Laboratory {
                        id: lid,
                        name: lab.to_string(),
                    },
                    delivery_date: ymd(delivery),
                    status: status.to_string(),
                },
            )
            .collect::<Vec<Record>>();
        debug!("Created sample store with {} records", records.len());
        Self { records }
    }

    pub fn list_all(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
