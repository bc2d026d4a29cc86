use routier::prelude::*;
use serde_json::{json, Value};

#[controller(path = "/health")]
#[derive(Default)]
pub struct HealthController;

#[routes]
impl HealthController {
    #[get("/")]
    async fn check(&self) -> Json<Value> {
        Json(json!({ "status": "ok" }))
    }
}
