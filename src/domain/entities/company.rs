use serde::{Deserialize, Serialize};

use crate::{format_money, format_opt_i64, usn_display};

pub const ACCREDITATION_ACTIVE: &str = "Действует";
pub const UNKNOWN_VALUE: &str = "—";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Company {
    pub full_name: String,
    pub short_name: String,
    pub inn: String,
    pub registered_at: Option<String>,
    pub ceo: String,
    pub okved: Option<String>,
    pub revenue: Option<i64>,
    pub expenses: Option<i64>,
    pub taxes: Option<i64>,
    pub tax_year: Option<i64>,
    pub staff: Option<i64>,
    pub staff_year: Option<i64>,
    pub uses_usn: Option<bool>,
    pub msme_at: Option<String>,
    pub accreditation: Option<Accreditation>,
}

impl Company {
    pub fn financial_result(&self) -> Option<i64> {
        match (self.revenue, self.expenses) {
            (Some(revenue), Some(expenses)) => Some(revenue - expenses),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.short_name.trim().is_empty() {
            &self.full_name
        } else {
            &self.short_name
        }
    }

    pub fn is_accredited(&self) -> bool {
        self.accreditation
            .as_ref()
            .map(|record| record.status == ACCREDITATION_ACTIVE)
            .unwrap_or(false)
    }

    pub fn accreditation_status(&self) -> String {
        self.accreditation
            .as_ref()
            .map(|record| record.status.clone())
            .unwrap_or_else(|| UNKNOWN_VALUE.to_string())
    }

    // Everything the table row renders, used by the quick in-table search.
    pub fn row_text(&self) -> String {
        [
            self.short_name.clone(),
            self.full_name.clone(),
            self.inn.clone(),
            self.okved.clone().unwrap_or_default(),
            self.ceo.clone(),
            format_money(self.revenue),
            format_money(self.taxes),
            format_opt_i64(self.staff),
            usn_display(self.uses_usn).to_string(),
            self.accreditation_status(),
        ]
        .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accreditation {
    pub status: String,
    #[serde(default)]
    pub decision_number: String,
    #[serde(default)]
    pub decision_date: Option<String>,
    #[serde(default)]
    pub registry_record_date: Option<String>,
}

/// Flat display record behind the hover card, `—` for unknown values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub inn: String,
    pub okved: String,
    pub revenue: String,
    pub expenses: String,
    pub taxes: String,
    pub tax_year: String,
    pub staff: String,
    pub staff_year: String,
    pub uses_usn: String,
    pub ceo: String,
    pub registered_at: String,
    pub msme_at: String,
    pub financial_result: String,
    pub accreditation_status: String,
    pub accreditation_decision: String,
    pub accreditation_date: String,
}

impl CompanyInfo {
    pub fn from_company(company: &Company) -> Self {
        let unknown = || UNKNOWN_VALUE.to_string();
        let text = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty()).unwrap_or_else(unknown);
        let accreditation_date = company
            .accreditation
            .as_ref()
            .and_then(|record| {
                record
                    .registry_record_date
                    .clone()
                    .or_else(|| record.decision_date.clone())
            })
            .unwrap_or_else(unknown);
        let accreditation_decision = company
            .accreditation
            .as_ref()
            .map(|record| record.decision_number.clone())
            .filter(|number| !number.trim().is_empty())
            .unwrap_or_else(unknown);

        CompanyInfo {
            name: company.full_name.clone(),
            inn: if company.inn.trim().is_empty() {
                unknown()
            } else {
                company.inn.clone()
            },
            okved: text(&company.okved),
            revenue: format_money(company.revenue),
            expenses: format_money(company.expenses),
            taxes: format_money(company.taxes),
            tax_year: format_opt_i64(company.tax_year),
            staff: format_opt_i64(company.staff),
            staff_year: format_opt_i64(company.staff_year),
            uses_usn: usn_display(company.uses_usn).to_string(),
            ceo: if company.ceo.trim().is_empty() {
                unknown()
            } else {
                company.ceo.clone()
            },
            registered_at: text(&company.registered_at),
            msme_at: text(&company.msme_at),
            financial_result: format_money(company.financial_result()),
            accreditation_status: company.accreditation_status(),
            accreditation_decision,
            accreditation_date,
        }
    }

    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ИНН", self.inn.clone()),
            ("ОКВЭД", self.okved.clone()),
            ("Выручка", self.revenue.clone()),
            ("Расходы", self.expenses.clone()),
            ("Налоги", self.taxes.clone()),
            ("Год уплаты налогов", self.tax_year.clone()),
            ("Численность", self.staff.clone()),
            ("Год данных о численности", self.staff_year.clone()),
            ("УСН", self.uses_usn.clone()),
            ("Руководитель", self.ceo.clone()),
            ("Дата постановки на учёт", self.registered_at.clone()),
            ("В реестре МСП с", self.msme_at.clone()),
            ("Финансовый результат", self.financial_result.clone()),
            ("Аккредитация", self.accreditation_status.clone()),
            ("Номер решения", self.accreditation_decision.clone()),
            ("Дата записи в реестре", self.accreditation_date.clone()),
        ]
    }
}
