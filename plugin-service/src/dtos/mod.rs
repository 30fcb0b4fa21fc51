pub mod packs;
pub mod plugins;
pub mod users;

pub use packs::PackInfoResponse;
pub use plugins::PluginListResponse;
pub use users::{
    CompanyStatsResponse, CompanyView, MachinesResponse, UserInfoResponse, UserPluginsResponse,
    UserView,
};

pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
