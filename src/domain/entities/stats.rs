use crate::domain::entities::company::Company;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryStats {
    pub count: usize,
    pub total_revenue: Option<i64>,
    pub total_expenses: Option<i64>,
    pub total_taxes: Option<i64>,
    pub avg_staff: Option<f64>,
    pub usn_share: Option<f64>,
    pub accredited: usize,
    pub top_company: Option<String>,
}

pub fn calculate_stats(rows: &[Company]) -> DirectoryStats {
    fn total(rows: &[Company], field: impl Fn(&Company) -> Option<i64>) -> Option<i64> {
        let values: Vec<i64> = rows.iter().filter_map(&field).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum())
        }
    }

    let staff_values: Vec<i64> = rows.iter().filter_map(|row| row.staff).collect();
    let avg_staff = if staff_values.is_empty() {
        None
    } else {
        Some(staff_values.iter().sum::<i64>() as f64 / staff_values.len() as f64)
    };

    let usn_share = if rows.is_empty() {
        None
    } else {
        let matched = rows.iter().filter(|row| row.uses_usn == Some(true)).count();
        Some(matched as f64 * 100.0 / rows.len() as f64)
    };

    let mut top_company: Option<&Company> = None;
    let mut accredited = 0usize;
    for row in rows {
        if row.is_accredited() {
            accredited += 1;
        }
        let Some(revenue) = row.revenue else {
            continue;
        };
        match top_company {
            Some(current) if current.revenue.unwrap_or(i64::MIN) >= revenue => {}
            _ => top_company = Some(row),
        }
    }

    DirectoryStats {
        count: rows.len(),
        total_revenue: total(rows, |row| row.revenue),
        total_expenses: total(rows, |row| row.expenses),
        total_taxes: total(rows, |row| row.taxes),
        avg_staff,
        usn_share,
        accredited,
        top_company: top_company.map(|row| row.display_name().to_string()),
    }
}
