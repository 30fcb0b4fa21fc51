use crate::models::PackDetails;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PackInfoResponse {
    pub success: bool,
    pub pack_name: String,
    pub pack_info: PackDetails,
    pub timestamp: String,
}
