use std::sync::Mutex;

use routier::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{request_logging, require_api_key};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub name: String,
}

/// All routes dispatch onto the same instance, so the user list lives for
/// the lifetime of the application.
#[controller(path = "/users", middlewares = [request_logging()])]
#[derive(Default)]
pub struct UserController {
    users: Mutex<Vec<User>>,
}

#[routes]
impl UserController {
    #[get("/")]
    async fn list(&self) -> Json<Vec<User>> {
        Json(self.users.lock().unwrap().clone())
    }

    #[post("/")]
    async fn create(&self, request: Request) -> Response {
        let bytes = match axum::body::to_bytes(request.into_body(), 64 * 1024).await {
            Ok(bytes) => bytes,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };
        let payload: CreateUser = match serde_json::from_slice(&bytes) {
            Ok(payload) => payload,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };

        let user = User {
            id: Uuid::new_v4(),
            name: payload.name,
        };
        self.users.lock().unwrap().push(user.clone());

        (StatusCode::CREATED, Json(user)).into_response()
    }

    #[delete("/", middlewares = [require_api_key()])]
    async fn purge(&self) -> StatusCode {
        self.users.lock().unwrap().clear();
        StatusCode::NO_CONTENT
    }
}
