//! In-process stand-in for the task REST API.
//!
//! Serves the endpoints the client consumes from memory, with Mongo-style `_id`
//! fields, on a random local port.

#![allow(dead_code)]

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const PASSWORD: &str = "Password1!";

#[derive(Clone)]
struct MockUser {
    id: String,
    username: String,
    email: String,
    password: String,
}

#[derive(Clone)]
struct MockTask {
    id: String,
    owner: String,
    title: String,
    status: String,
}

impl MockTask {
    fn to_json(&self) -> Value {
        json!({ "_id": self.id, "title": self.title, "status": self.status, "__v": 0 })
    }
}

#[derive(Default)]
pub struct MockState {
    users: Mutex<Vec<MockUser>>,
    tokens: Mutex<HashMap<String, String>>,
    tasks: Mutex<Vec<MockTask>>,
    next_id: AtomicUsize,
    /// Makes `POST /api/user/email` answer 500.
    pub email_check_fails: AtomicBool,
    /// Requests received so far, any endpoint.
    pub requests: AtomicUsize,
}

impl MockState {
    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn next_id(&self) -> String {
        format!("{:024x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn task_titles(&self) -> Vec<(String, String)> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .map(|t| (t.title.clone(), t.status.clone()))
            .collect()
    }

    fn owner(&self, req: &HttpRequest) -> Result<String, HttpResponse> {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        token
            .and_then(|token| self.tokens.lock().unwrap().get(token).cloned())
            .ok_or_else(|| HttpResponse::Unauthorized().json(json!({ "message": "Invalid token" })))
    }
}

pub struct MockServer {
    pub base_url: String,
    pub state: web::Data<MockState>,
}

/// Starts the mock API. Must be called from within an actix runtime.
pub fn spawn() -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let state = web::Data::new(MockState::default());

    let app_state = state.clone();
    let server = HttpServer::new(move || App::new().app_data(app_state.clone()).configure(routes))
        .workers(1)
        .listen(listener)
        .expect("Failed to listen")
        .run();
    actix_rt::spawn(server);

    MockServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    }
}

/// A local address nothing listens on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/auth", web::post().to(login))
        .route("/api/user", web::post().to(register))
        .route("/api/user/email", web::post().to(email_exists))
        .route("/api/tasks", web::get().to(list_tasks))
        .route("/api/tasks", web::post().to(create_task))
        .route("/api/tasks/{id}", web::patch().to(update_task))
        .route("/api/tasks/{id}", web::delete().to(delete_task));
}

fn field<'a>(body: &'a Value, key: &str) -> &'a str {
    body.get(key).and_then(Value::as_str).unwrap_or_default()
}

async fn login(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    state.hit();
    let email = field(&body, "email");
    let password = field(&body, "password");

    let user = state
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned();
    match user {
        Some(user) => {
            let token = format!("token-{}", state.next_id());
            state
                .tokens
                .lock()
                .unwrap()
                .insert(token.clone(), user.email.clone());
            HttpResponse::Ok().json(json!({
                "user": { "_id": user.id, "username": user.username, "email": user.email },
                "token": token
            }))
        }
        None => HttpResponse::Unauthorized().json(json!({ "message": "Invalid email or password" })),
    }
}

async fn register(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    state.hit();
    let email = field(&body, "email").to_string();
    let mut users = state.users.lock().unwrap();
    if users.iter().any(|u| u.email == email) {
        return HttpResponse::BadRequest().json(json!({ "message": "Email already registered" }));
    }
    let user = MockUser {
        id: state.next_id(),
        username: field(&body, "username").to_string(),
        email,
        password: field(&body, "password").to_string(),
    };
    let response = json!({ "_id": user.id, "username": user.username, "email": user.email });
    users.push(user);
    HttpResponse::Created().json(response)
}

async fn email_exists(state: web::Data<MockState>, body: web::Json<Value>) -> HttpResponse {
    state.hit();
    if state.email_check_fails.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({ "message": "database unavailable" }));
    }
    let email = field(&body, "email");
    let exists = state.users.lock().unwrap().iter().any(|u| u.email == email);
    HttpResponse::Ok().json(json!({ "exists": exists }))
}

async fn list_tasks(state: web::Data<MockState>, req: HttpRequest) -> HttpResponse {
    state.hit();
    let owner = match state.owner(&req) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let tasks: Vec<Value> = state
        .tasks
        .lock()
        .unwrap()
        .iter()
        .filter(|t| t.owner == owner)
        .map(MockTask::to_json)
        .collect();
    HttpResponse::Ok().json(tasks)
}

async fn create_task(
    state: web::Data<MockState>,
    req: HttpRequest,
    body: web::Json<Value>,
) -> HttpResponse {
    state.hit();
    let owner = match state.owner(&req) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let title = field(&body, "title").trim().to_string();
    if title.is_empty() {
        return HttpResponse::BadRequest().json(json!({ "message": "Title is required" }));
    }
    let task = MockTask {
        id: state.next_id(),
        owner,
        title,
        status: "todo".to_string(),
    };
    let response = task.to_json();
    state.tasks.lock().unwrap().push(task);
    HttpResponse::Created().json(response)
}

async fn update_task(
    state: web::Data<MockState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<Value>,
) -> HttpResponse {
    state.hit();
    let owner = match state.owner(&req) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id = path.into_inner();
    let mut tasks = state.tasks.lock().unwrap();
    let Some(task) = tasks.iter_mut().find(|t| t.id == id && t.owner == owner) else {
        return HttpResponse::NotFound().json(json!({ "message": "Task not found" }));
    };
    if let Some(title) = body.get("title").and_then(Value::as_str) {
        task.title = title.to_string();
    }
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        task.status = status.to_string();
    }
    HttpResponse::Ok().json(task.to_json())
}

async fn delete_task(
    state: web::Data<MockState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> HttpResponse {
    state.hit();
    let owner = match state.owner(&req) {
        Ok(owner) => owner,
        Err(response) => return response,
    };
    let id = path.into_inner();
    let mut tasks = state.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|t| !(t.id == id && t.owner == owner));
    if tasks.len() == before {
        return HttpResponse::NotFound().json(json!({ "message": "Task not found" }));
    }
    HttpResponse::Ok().json(json!({ "message": "Task deleted" }))
}
