use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::config::Config;
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, NewAttendance};
use crate::model::student::Student;
use crate::routes;
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::{self, Store};

/// App wired exactly like `main`, backed by a fresh in-memory store.
pub async fn test_app() -> (
    impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    web::Data<AppState>,
) {
    test_app_with_store(Arc::new(MemoryStore::default())).await
}

pub async fn test_app_with_store(
    store: Arc<dyn Store>,
) -> (
    impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    web::Data<AppState>,
) {
    let config = Config::default();
    let state = web::Data::new(AppState::new(store, &config));

    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .app_data(web::Data::new(config.clone()))
            .configure(|cfg| routes::configure(cfg, &config)),
    )
    .await;

    (app, state)
}

/// Register a student through the API and return it.
pub async fn register<S, B>(app: &S, name: &str, roll_no: &str, class: &str) -> Student
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/students")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .set_json(json!({"name": name, "roll_no": roll_no, "class": class}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED, "registering {roll_no}");

    let body: Value = test::read_body_json(resp).await;
    serde_json::from_value(body["student"].clone()).unwrap()
}

/// Memory store whose existence checks always miss, so every write
/// reaches the unique keys as if a concurrent request won the race.
#[derive(Default)]
pub struct StaleReadStore {
    inner: MemoryStore,
}

#[async_trait]
impl Store for StaleReadStore {
    async fn insert_student(&self, student: &Student) -> store::Result<()> {
        self.inner.insert_student(student).await
    }

    async fn find_student(&self, id: &str) -> store::Result<Option<Student>> {
        self.inner.find_student(id).await
    }

    async fn roll_number_exists(&self, _roll_no: &str) -> store::Result<bool> {
        Ok(false)
    }

    async fn find_attendance(&self, _student_id: &str, _date: NaiveDate) -> store::Result<Option<u64>> {
        Ok(None)
    }

    async fn insert_attendance(&self, new: NewAttendance) -> store::Result<AttendanceRecord> {
        self.inner.insert_attendance(new).await
    }

    async fn list_attendance(&self, date: NaiveDate) -> store::Result<Vec<AttendanceEntry>> {
        self.inner.list_attendance(date).await
    }

    async fn roll_numbers(&self) -> store::Result<Vec<String>> {
        self.inner.roll_numbers().await
    }

    async fn recent_students(&self, days: u32) -> store::Result<Vec<Student>> {
        self.inner.recent_students(days).await
    }
}
