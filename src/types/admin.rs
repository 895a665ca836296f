use serde::Serialize;

use crate::admin::UserOverview;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub is_admin: bool,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserOverview>,
}
