use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::entities::company::Company;
use crate::usecase::ports::source::{CompanySource, SourceError};

const HEADER_FULL_NAME: &str = "Полное наименование";
const HEADER_SHORT_NAME: &str = "Сокращенное наименование";
const HEADER_INN: &str = "ИНН";
const HEADER_REGISTERED_AT: &str = "Дата постановки на учёт";
const HEADER_CEO: &str = "ИНН, ФИО руководителя";
const HEADER_OKVED: &str = "Основной ОКВЭД";
const HEADER_REVENUE: &str = "Выручка, руб.";
const HEADER_EXPENSES: &str = "Расходы, руб.";
const HEADER_TAXES: &str = "Сумма уплаченных налогов, руб.";
const HEADER_TAX_YEAR: &str = "Год уплаты налогов";
const HEADER_STAFF: &str = "Среднесписочная численность";
const HEADER_STAFF_YEAR: &str = "Год данных о численности";
const HEADER_USES_USN: &str = "Применяет УСН";
const HEADER_MSME_AT: &str = "Дата включения в реестр МСП";

pub struct CsvCompanySource {
    pub path: PathBuf,
}

impl CompanySource for CsvCompanySource {
    fn load(&self) -> Result<Vec<Company>, SourceError> {
        load_companies(&self.path).map_err(|err| SourceError::Message(err.to_string()))
    }
}

pub fn load_companies(path: &Path) -> Result<Vec<Company>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open companies csv: {}", path.display()))?;

    // The export tool prepends a UTF-8 BOM to the first header cell.
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed to read headers from csv: {}", path.display()))?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let column = |name: &str| headers.iter().position(|header| header == name);
    let full_name = column(HEADER_FULL_NAME);
    let short_name = column(HEADER_SHORT_NAME);
    let inn = column(HEADER_INN);
    let registered_at = column(HEADER_REGISTERED_AT);
    let ceo = column(HEADER_CEO);
    let okved = column(HEADER_OKVED);
    let revenue = column(HEADER_REVENUE);
    let expenses = column(HEADER_EXPENSES);
    let taxes = column(HEADER_TAXES);
    let tax_year = column(HEADER_TAX_YEAR);
    let staff = column(HEADER_STAFF);
    let staff_year = column(HEADER_STAFF_YEAR);
    let uses_usn = column(HEADER_USES_USN);
    let msme_at = column(HEADER_MSME_AT);

    let mut companies = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        companies.push(Company {
            full_name: field(full_name).trim().to_string(),
            short_name: field(short_name).trim().to_string(),
            inn: field(inn).trim().to_string(),
            registered_at: clean_str(field(registered_at)),
            ceo: field(ceo).trim().to_string(),
            okved: clean_str(field(okved)),
            revenue: parse_money(field(revenue)),
            expenses: parse_money(field(expenses)),
            taxes: parse_money(field(taxes)),
            tax_year: parse_int(field(tax_year)),
            staff: parse_int(field(staff)),
            staff_year: parse_int(field(staff_year)),
            uses_usn: parse_bool(field(uses_usn)),
            msme_at: clean_str(field(msme_at)),
            accreditation: None,
        });
    }

    Ok(companies)
}

pub fn clean_str(value: &str) -> Option<String> {
    let text = value.trim();
    if text.is_empty() || text.to_lowercase().starts_with("нет данных") {
        None
    } else {
        Some(text.to_string())
    }
}

pub fn parse_money(value: &str) -> Option<i64> {
    let text = clean_str(value)?;
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '₽' && *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let amount = cleaned.parse::<f64>().ok()?;
    if !amount.is_finite() {
        return None;
    }
    Some(amount.round() as i64)
}

pub fn parse_int(value: &str) -> Option<i64> {
    clean_str(value)?.parse::<i64>().ok()
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match clean_str(value)?.to_lowercase().as_str() {
        "да" | "yes" => Some(true),
        "нет" | "no" => Some(false),
        _ => None,
    }
}
