use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::company::Company;
use crate::domain::entities::stats::{calculate_stats, DirectoryStats};
use crate::usecase::services::directory_service::collect_selected;
use crate::{format_money, format_opt_i64, usn_display};

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub companies: Vec<Company>,
    pub stats: DirectoryStats,
    pub created_at: String,
}

pub fn build_report(rows: &[Company], selected: &BTreeSet<String>) -> Report {
    let companies = collect_selected(rows, selected);
    let stats = calculate_stats(&companies);
    Report {
        companies,
        stats,
        created_at: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
    }
}

pub fn write_report_csv(report: &Report, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("failed to create report file: {}", path.display()))?;

    writer
        .write_record([
            "Название",
            "ИНН",
            "ОКВЭД",
            "Выручка",
            "Расходы",
            "Налоги",
            "Численность",
            "УСН",
            "Аккредитация",
        ])
        .context("failed to write report header")?;

    for company in &report.companies {
        writer
            .write_record([
                company.display_name().to_string(),
                company.inn.clone(),
                company.okved.clone().unwrap_or_default(),
                format_money(company.revenue),
                format_money(company.expenses),
                format_money(company.taxes),
                format_opt_i64(company.staff),
                usn_display(company.uses_usn).to_string(),
                company.accreditation_status(),
            ])
            .context("failed to write report row")?;
    }

    writer
        .write_record([
            "Итого".to_string(),
            report.stats.count.to_string(),
            String::new(),
            format_money(report.stats.total_revenue),
            format_money(report.stats.total_expenses),
            format_money(report.stats.total_taxes),
            String::new(),
            String::new(),
            report.stats.accredited.to_string(),
        ])
        .context("failed to write report summary")?;

    writer.flush().context("failed to flush report file")?;
    Ok(())
}
