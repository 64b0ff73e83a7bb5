use serde::Serialize;

#[derive(Serialize)]
pub struct ActivityLogQuery {
    pub limit: u32,
}
