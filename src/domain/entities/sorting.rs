use std::cmp::Ordering;

use crate::domain::entities::company::Company;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Inn,
    Okved,
    Revenue,
    Taxes,
    Staff,
    Accreditation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn kind(self) -> SortKind {
        match self {
            SortColumn::Revenue | SortColumn::Taxes | SortColumn::Staff => SortKind::Numeric,
            _ => SortKind::Text,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Name => "Название",
            SortColumn::Inn => "ИНН",
            SortColumn::Okved => "ОКВЭД",
            SortColumn::Revenue => "Выручка",
            SortColumn::Taxes => "Налоги",
            SortColumn::Staff => "Численность",
            SortColumn::Accreditation => "Аккредитация",
        }
    }
}

// Numeric columns always restart ascending; only text columns toggle on a
// repeated click of the same header.
pub fn next_sort(current: Option<SortSpec>, clicked: SortColumn) -> SortSpec {
    let direction = match clicked.kind() {
        SortKind::Numeric => SortDirection::Ascending,
        SortKind::Text => match current {
            Some(spec) if spec.column == clicked && spec.direction == SortDirection::Ascending => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        },
    };
    SortSpec {
        column: clicked,
        direction,
    }
}

pub fn numeric_sort_value(row: &Company, column: SortColumn) -> i64 {
    let value = match column {
        SortColumn::Revenue => row.revenue,
        SortColumn::Taxes => row.taxes,
        SortColumn::Staff => row.staff,
        _ => None,
    };
    value.unwrap_or(0)
}

pub fn text_sort_key(row: &Company, column: SortColumn) -> String {
    let text = match column {
        SortColumn::Name => row.display_name().to_string(),
        SortColumn::Inn => row.inn.clone(),
        SortColumn::Okved => row.okved.clone().unwrap_or_default(),
        SortColumn::Accreditation => row.accreditation_status(),
        _ => String::new(),
    };
    // `ё` collates next to `е`.
    text.trim().to_lowercase().replace('ё', "е")
}

pub fn compare_rows(a: &Company, b: &Company, spec: SortSpec) -> Ordering {
    let ordering = match spec.column.kind() {
        SortKind::Numeric => {
            numeric_sort_value(a, spec.column).cmp(&numeric_sort_value(b, spec.column))
        }
        SortKind::Text => text_sort_key(a, spec.column).cmp(&text_sort_key(b, spec.column)),
    };
    match spec.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

pub fn sort_rows(rows: &mut [Company], spec: SortSpec) {
    rows.sort_by(|a, b| compare_rows(a, b, spec));
}

pub fn sort_indicator(current: Option<SortSpec>, column: SortColumn) -> &'static str {
    match current {
        Some(spec) if spec.column == column => match spec.direction {
            SortDirection::Ascending => " ↑",
            SortDirection::Descending => " ↓",
        },
        _ => "",
    }
}
