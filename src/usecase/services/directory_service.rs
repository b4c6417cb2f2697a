use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::entities::company::{Accreditation, Company};
use crate::usecase::ports::source::{CompanySource, InnSyncResult, SourceError};

pub struct DirectoryService {
    source: Arc<dyn CompanySource>,
}

impl DirectoryService {
    pub fn new(source: Arc<dyn CompanySource>) -> Self {
        Self { source }
    }

    pub fn load_companies(&self) -> Result<Vec<Company>, SourceError> {
        self.source.load()
    }
}

pub fn apply_sync_results(rows: &mut [Company], results: &[InnSyncResult]) {
    for result in results {
        if !result.success {
            continue;
        }
        let Some(status) = &result.status else {
            continue;
        };
        for row in rows.iter_mut().filter(|row| row.inn == result.inn) {
            row.accreditation = Some(Accreditation {
                status: status.clone(),
                decision_number: String::new(),
                decision_date: None,
                registry_record_date: None,
            });
        }
    }
}

pub fn collect_selected(rows: &[Company], selected: &BTreeSet<String>) -> Vec<Company> {
    rows.iter()
        .filter(|row| selected.contains(&row.inn))
        .cloned()
        .collect()
}
