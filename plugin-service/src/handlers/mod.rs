pub mod health;
pub mod packs;
pub mod plugins;
pub mod users;

pub use health::{home, status};
pub use packs::pack_info;
pub use plugins::{get_plugin, list_plugins};
pub use users::{company_stats, machines, user_info, user_plugins};
