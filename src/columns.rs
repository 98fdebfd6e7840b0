use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::LOVError;
use crate::filter::FilterKind;
use crate::records::{Laboratory, Patient, Record};
use crate::sort::SortKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    Date,
    OrderNumber,
    Patient,
    Laboratory,
    DeliveryDate,
    Status,
}

impl ColumnId {
    pub const ALL: [ColumnId; 6] = [
        ColumnId::Date,
        ColumnId::OrderNumber,
        ColumnId::Patient,
        ColumnId::Laboratory,
        ColumnId::DeliveryDate,
        ColumnId::Status,
    ];

    /// Name of the record field the column reads.
    pub fn key(&self) -> &'static str {
        match self {
            ColumnId::Date => "date",
            ColumnId::OrderNumber => "orderNumber",
            ColumnId::Patient => "patient",
            ColumnId::Laboratory => "laboratory",
            ColumnId::DeliveryDate => "deliveryDate",
            ColumnId::Status => "status",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ColumnId {
    type Err = LOVError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnId::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LOVError::UnknownColumn(s.to_string()))
    }
}

/// Raw value of a record field, before any display formatting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Date(NaiveDate),
    Number(i64),
    Text(&'a str),
    Patient(&'a Patient),
    Laboratory(&'a Laboratory),
}

impl CellValue<'_> {
    /// Strings a substring filter is matched against.
    pub fn search_terms(&self) -> Vec<String> {
        match self {
            CellValue::Date(d) => vec![d.to_string()],
            CellValue::Number(n) => vec![n.to_string()],
            CellValue::Text(s) => vec![s.to_string()],
            CellValue::Patient(p) => vec![
                p.first_name.clone(),
                p.last_name.clone(),
                p.id.to_string(),
            ],
            CellValue::Laboratory(l) => vec![l.name.clone(), l.id.to_string()],
        }
    }

    /// Identity of the value when counting distinct values of a column.
    pub fn facet_key(&self) -> String {
        match self {
            CellValue::Date(d) => d.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.to_string(),
            CellValue::Patient(p) => format!("{}|{}|{}", p.id, p.first_name, p.last_name),
            CellValue::Laboratory(l) => format!("{}|{}", l.id, l.name),
        }
    }

    /// Natural ordering of the underlying type. Nested values compare by
    /// their display text, mismatched variants compare equal.
    pub fn natural_cmp(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Number(a), CellValue::Number(b)) => a.cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
            (CellValue::Patient(_), CellValue::Patient(_))
            | (CellValue::Laboratory(_), CellValue::Laboratory(_)) => {
                Formatter::Plain.format(self).cmp(&Formatter::Plain.format(other))
            }
            _ => Ordering::Equal,
        }
    }
}

/// How a cell is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// `d.m.yyyy`, the de-DE short date.
    GermanDate,
    Plain,
}

impl Formatter {
    pub fn format(&self, value: &CellValue) -> String {
        match (self, value) {
            (Formatter::GermanDate, CellValue::Date(d)) => d.format("%-d.%-m.%Y").to_string(),
            (_, CellValue::Date(d)) => d.to_string(),
            (_, CellValue::Number(n)) => n.to_string(),
            (_, CellValue::Text(s)) => s.to_string(),
            (_, CellValue::Patient(p)) => format!("{} {}", p.first_name, p.last_name),
            (_, CellValue::Laboratory(l)) => l.name.clone(),
        }
    }
}

/// Plain column description: no render closures, behaviour is looked up by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: ColumnId,
    pub header: &'static str,
    pub formatter: Formatter,
    pub filter: Option<FilterKind>,
    pub sort: Option<SortKind>,
}

impl ColumnDef {
    pub fn value<'a>(&self, record: &'a Record) -> CellValue<'a> {
        match self.id {
            ColumnId::Date => CellValue::Date(record.date),
            ColumnId::OrderNumber => CellValue::Number(i64::from(record.order_number)),
            ColumnId::Patient => CellValue::Patient(&record.patient),
            ColumnId::Laboratory => CellValue::Laboratory(&record.laboratory),
            ColumnId::DeliveryDate => CellValue::Date(record.delivery_date),
            ColumnId::Status => CellValue::Text(&record.status),
        }
    }

    pub fn render(&self, record: &Record) -> String {
        self.formatter.format(&self.value(record))
    }

    pub fn can_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn can_sort(&self) -> bool {
        self.sort.is_some()
    }
}

pub fn default_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            id: ColumnId::Date,
            header: "DATUM",
            formatter: Formatter::GermanDate,
            filter: Some(FilterKind::DateRange),
            sort: Some(SortKind::Datetime),
        },
        ColumnDef {
            id: ColumnId::OrderNumber,
            header: "AUFTRAGSNR.",
            formatter: Formatter::Plain,
            filter: Some(FilterKind::ExactMatch),
            sort: Some(SortKind::Natural),
        },
        ColumnDef {
            id: ColumnId::Patient,
            header: "PATIENT",
            formatter: Formatter::Plain,
            filter: Some(FilterKind::Text),
            sort: Some(SortKind::Natural),
        },
        ColumnDef {
            id: ColumnId::Laboratory,
            header: "LABOR",
            formatter: Formatter::Plain,
            filter: Some(FilterKind::Text),
            sort: Some(SortKind::Natural),
        },
        ColumnDef {
            id: ColumnId::DeliveryDate,
            header: "LIEFERDATUM",
            formatter: Formatter::GermanDate,
            filter: Some(FilterKind::DateRange),
            sort: Some(SortKind::Datetime),
        },
        ColumnDef {
            id: ColumnId::Status,
            header: "STATUS",
            formatter: Formatter::Plain,
            filter: Some(FilterKind::Text),
            sort: Some(SortKind::Natural),
        },
    ]
}

pub fn find_column(columns: &[ColumnDef], id: ColumnId) -> Option<&ColumnDef> {
    columns.iter().find(|c| c.id == id)
}
