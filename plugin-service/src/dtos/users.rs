use crate::models::{ArtifactMeta, Company, Identity, MachineRecord};
use crate::services::stats::CompanyStats;
use crate::services::DetailedPermissions;
use serde::Serialize;
use std::collections::BTreeMap;

/// Identity view without the credential secret or the machine registry.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub allowed_plugins: Vec<String>,
    pub allowed_packs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl From<&Identity> for UserView {
    fn from(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity.email.clone(),
            external_user: identity.external_user.clone(),
            device_name: identity.device_name.clone(),
            allowed_plugins: identity.allowed_plugins.clone(),
            allowed_packs: identity.allowed_packs.clone(),
            expires: identity.expires.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompanyView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&Company> for CompanyView {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            created_at: company.created_at.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub success: bool,
    pub user: UserView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<CompanyView>,
    pub plugins_details: Vec<ArtifactMeta>,
    pub total_plugins: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct UserPluginsResponse {
    pub success: bool,
    pub user_name: String,
    pub allowed_packs: Vec<String>,
    #[serde(flatten)]
    pub permissions: DetailedPermissions,
    pub total_plugins: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MachinesResponse {
    pub success: bool,
    pub email: String,
    pub machines: BTreeMap<String, MachineRecord>,
    pub total_machines: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct CompanyStatsResponse {
    pub success: bool,
    pub company_id: String,
    pub company_stats: CompanyStats,
    pub timestamp: String,
}
