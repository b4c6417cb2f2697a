use crate::domain::entities::company::Company;
use crate::format_amount;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub search: String,
    pub okved: Option<String>,
    pub uses_usn: Option<bool>,
    pub is_accredited: Option<bool>,
    pub min_revenue: Option<i64>,
    pub max_revenue: Option<i64>,
    pub min_taxes: Option<i64>,
    pub min_staff: Option<i64>,
    pub tax_year: Option<i64>,
    pub staff_year: Option<i64>,
}

pub fn matches_filters(row: &Company, filters: &FilterSet) -> bool {
    if !filters.search.trim().is_empty() {
        let haystack = [
            row.full_name.as_str(),
            row.short_name.as_str(),
            row.ceo.as_str(),
            row.okved.as_deref().unwrap_or(""),
        ]
        .join(" ")
        .to_lowercase();
        if !haystack.contains(&filters.search.trim().to_lowercase()) {
            return false;
        }
    }
    if let Some(okved) = &filters.okved {
        if row.okved.as_deref() != Some(okved.as_str()) {
            return false;
        }
    }
    if let Some(uses_usn) = filters.uses_usn {
        if row.uses_usn != Some(uses_usn) {
            return false;
        }
    }
    if let Some(is_accredited) = filters.is_accredited {
        if row.is_accredited() != is_accredited {
            return false;
        }
    }
    if let Some(min_revenue) = filters.min_revenue {
        if row.revenue.map(|value| value < min_revenue).unwrap_or(true) {
            return false;
        }
    }
    if let Some(max_revenue) = filters.max_revenue {
        if row.revenue.map(|value| value > max_revenue).unwrap_or(true) {
            return false;
        }
    }
    if let Some(min_taxes) = filters.min_taxes {
        if row.taxes.map(|value| value < min_taxes).unwrap_or(true) {
            return false;
        }
    }
    if let Some(min_staff) = filters.min_staff {
        if row.staff.map(|value| value < min_staff).unwrap_or(true) {
            return false;
        }
    }
    if let Some(tax_year) = filters.tax_year {
        if row.tax_year != Some(tax_year) {
            return false;
        }
    }
    if let Some(staff_year) = filters.staff_year {
        if row.staff_year != Some(staff_year) {
            return false;
        }
    }
    true
}

pub fn apply_filters(rows: &[Company], filters: &FilterSet) -> Vec<Company> {
    rows.iter()
        .filter(|row| matches_filters(row, filters))
        .cloned()
        .collect()
}

pub fn describe_active_filters(filters: &FilterSet) -> Vec<String> {
    let mut descriptions = Vec::new();
    if !filters.search.trim().is_empty() {
        descriptions.push(format!("Поиск: \"{}\"", filters.search.trim()));
    }
    if let Some(okved) = &filters.okved {
        descriptions.push(format!("ОКВЭД: {okved}"));
    }
    match filters.uses_usn {
        Some(true) => descriptions.push("Только компании на УСН".to_string()),
        Some(false) => descriptions.push("Без УСН".to_string()),
        None => {}
    }
    match filters.is_accredited {
        Some(true) => descriptions.push("Только аккредитованные".to_string()),
        Some(false) => descriptions.push("Только неаккредитованные".to_string()),
        None => {}
    }
    if let Some(value) = filters.min_revenue {
        descriptions.push(format!("Выручка ≥ {} ₽", format_amount(value)));
    }
    if let Some(value) = filters.max_revenue {
        descriptions.push(format!("Выручка ≤ {} ₽", format_amount(value)));
    }
    if let Some(value) = filters.min_taxes {
        descriptions.push(format!("Налоги ≥ {} ₽", format_amount(value)));
    }
    if let Some(value) = filters.min_staff {
        descriptions.push(format!("Численность ≥ {value}"));
    }
    if let Some(value) = filters.tax_year {
        descriptions.push(format!("Год уплаты налогов: {value}"));
    }
    if let Some(value) = filters.staff_year {
        descriptions.push(format!("Год численности: {value}"));
    }
    descriptions
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub okveds: Vec<String>,
    pub tax_years: Vec<i64>,
    pub staff_years: Vec<i64>,
}

pub fn available_filter_options(rows: &[Company]) -> FilterOptions {
    let mut okveds: Vec<String> = rows.iter().filter_map(|row| row.okved.clone()).collect();
    okveds.sort();
    okveds.dedup();

    let mut tax_years: Vec<i64> = rows.iter().filter_map(|row| row.tax_year).collect();
    tax_years.sort_unstable_by(|a, b| b.cmp(a));
    tax_years.dedup();

    let mut staff_years: Vec<i64> = rows.iter().filter_map(|row| row.staff_year).collect();
    staff_years.sort_unstable_by(|a, b| b.cmp(a));
    staff_years.dedup();

    FilterOptions {
        okveds,
        tax_years,
        staff_years,
    }
}

/// Raw values of the filter form fields, keyed the way the server names them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterForm {
    pub okved: String,
    pub uses_usn: String,
    pub is_accredited: String,
    pub min_revenue: String,
    pub max_revenue: String,
    pub min_taxes: String,
    pub min_staff: String,
    pub tax_year: String,
    pub staff_year: String,
}

impl FilterForm {
    pub fn to_filter_set(&self, search: &str) -> FilterSet {
        FilterSet {
            search: search.trim().to_string(),
            okved: if self.okved.is_empty() {
                None
            } else {
                Some(self.okved.clone())
            },
            uses_usn: parse_tri_state(&self.uses_usn),
            is_accredited: parse_tri_state(&self.is_accredited),
            min_revenue: parse_amount(&self.min_revenue),
            max_revenue: parse_amount(&self.max_revenue),
            min_taxes: parse_amount(&self.min_taxes),
            min_staff: parse_amount(&self.min_staff),
            tax_year: parse_amount(&self.tax_year),
            staff_year: parse_amount(&self.staff_year),
        }
    }
}

pub fn parse_amount(value: &str) -> Option<i64> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '₽')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<i64>().ok()
}

pub fn parse_tri_state(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

pub const PRESET_MIN_REVENUE: i64 = 500_000_000;
pub const PRESET_MIN_STAFF: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickFilter {
    HighRevenue,
    LargeStaff,
    UsnOnly,
}

pub const QUICK_FILTERS: [QuickFilter; 3] = [
    QuickFilter::HighRevenue,
    QuickFilter::LargeStaff,
    QuickFilter::UsnOnly,
];

impl QuickFilter {
    pub fn label(self) -> &'static str {
        match self {
            QuickFilter::HighRevenue => "Выручка от 500 млн",
            QuickFilter::LargeStaff => "Штат от 100",
            QuickFilter::UsnOnly => "На УСН",
        }
    }

    pub fn write_into(self, form: &mut FilterForm) {
        match self {
            QuickFilter::HighRevenue => form.min_revenue = PRESET_MIN_REVENUE.to_string(),
            QuickFilter::LargeStaff => form.min_staff = PRESET_MIN_STAFF.to_string(),
            QuickFilter::UsnOnly => form.uses_usn = "yes".to_string(),
        }
    }
}

pub fn matches_live_query(row_text: &str, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || row_text.to_lowercase().contains(&needle)
}
