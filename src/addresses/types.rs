use serde::Serialize;

#[derive(Serialize)]
pub struct AddressCreatePlan {
    pub action: &'static str,
    pub email: String,
}

#[derive(Serialize)]
pub struct AddressDeletePlan {
    pub action: &'static str,
    pub id: String,
}
