use crate::models::Directory;
use crate::services::catalog::ArtifactCatalog;
use chrono::{Local, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CompanyStats {
    pub company_name: String,
    pub total_users: usize,
    pub active_users: usize,
    pub expired_users: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GlobalStats {
    pub total_companies: usize,
    pub active_companies: usize,
    pub total_users: usize,
    pub active_users: usize,
    pub total_accounts: usize,
    pub active_accounts: usize,
    pub total_plugins: usize,
}

fn is_expired(expires: &str) -> bool {
    match NaiveDate::parse_from_str(expires, "%Y-%m-%d") {
        Ok(date) => Local::now().date_naive() > date,
        // Unparseable dates count as non-expired, mirroring authentication.
        Err(_) => false,
    }
}

/// Statistics for one company. Inactive users are counted in the total but
/// in neither the active nor the expired bucket.
pub fn company_stats(directory: &Directory, company_id: &str) -> Option<CompanyStats> {
    let company = directory.companies.get(company_id)?;

    let mut active_users = 0;
    let mut expired_users = 0;
    for user in company.users.values() {
        if !user.active {
            continue;
        }
        match &user.expires {
            Some(expires) if is_expired(expires) => expired_users += 1,
            _ => active_users += 1,
        }
    }

    Some(CompanyStats {
        company_name: company.name.clone(),
        total_users: company.users.len(),
        active_users,
        expired_users,
        created_at: company.created_at.clone(),
    })
}

/// System-wide statistics. User counts cover active companies only; flat
/// accounts are reported separately.
pub async fn global_stats(directory: &Directory, catalog: &ArtifactCatalog) -> GlobalStats {
    let total_companies = directory.companies.len();
    let active_companies = directory.companies.values().filter(|c| c.active).count();

    let mut total_users = 0;
    let mut active_users = 0;
    for company in directory.companies.values().filter(|c| c.active) {
        total_users += company.users.len();
        active_users += company.users.values().filter(|u| u.active).count();
    }

    GlobalStats {
        total_companies,
        active_companies,
        total_users,
        active_users,
        total_accounts: directory.users.len(),
        active_accounts: directory.users.values().filter(|u| u.active).count(),
        total_plugins: catalog.list_artifacts().await.len(),
    }
}
