use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::error::AppError;
use crate::model::student::Student;
use crate::models::Notification;
use crate::qr::{self, QrSize};
use crate::state::AppState;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateStudent {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "CS-042")]
    pub roll_no: String,
    #[schema(example = "10-A")]
    pub class: String,
}

impl CreateStudent {
    /// Trimmed copy, or the first empty field.
    fn normalized(&self) -> Result<CreateStudent, AppError> {
        let field = |label: &str, value: &str| {
            let value = value.trim();
            if value.is_empty() {
                Err(AppError::Validation(format!("{label} is required")))
            } else {
                Ok(value.to_string())
            }
        };

        Ok(CreateStudent {
            name: field("Name", &self.name)?,
            roll_no: field("Roll number", &self.roll_no)?,
            class: field("Class", &self.class)?,
        })
    }
}

#[derive(Serialize, ToSchema)]
pub struct QrLinks {
    #[schema(example = "/api/students/5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11/qr?size=display")]
    pub display_url: String,
    #[schema(example = "/api/students/5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11/qr?size=download")]
    pub download_url: String,
    #[schema(example = "Asha Rao_CS-042_QR.png")]
    pub download_filename: String,
}

impl QrLinks {
    fn for_student(api_prefix: &str, student: &Student) -> Self {
        let base = format!("{}/students/{}/qr", api_prefix.trim_end_matches('/'), student.id);
        Self {
            display_url: format!("{base}?size=display"),
            download_url: format!("{base}?size=download"),
            download_filename: qr::download_filename(student),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RegisteredStudent {
    pub student: Student,
    pub qr: QrLinks,
    pub notification: Notification,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QrQuery {
    /// `display` (256 px, default) or `download` (512 px, attachment)
    pub size: Option<QrSize>,
}

/// true  => roll number AVAILABLE
/// false => roll number TAKEN
async fn is_roll_number_available(state: &AppState, roll_no: &str) -> Result<bool, AppError> {
    // Cuckoo filter: a miss is definitive
    if !state.roll_numbers.might_exist(roll_no) {
        return Ok(true);
    }

    let taken = state
        .store
        .roll_number_exists(roll_no)
        .await
        .map_err(AppError::store("Failed to register student. Please try again."))?;
    Ok(!taken)
}

/// Register a student and return links to their QR code
#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student registered", body = RegisteredStudent),
        (status = 400, description = "A field is empty", body = Notification),
        (status = 409, description = "Roll number already exists", body = Notification, example = json!({
            "title": "Error",
            "description": "Roll number already exists!",
            "variant": "destructive"
        })),
        (status = 500, description = "Internal server error", body = Notification)
    ),
    tag = "Students"
)]
#[instrument(name = "register_student", skip_all, fields(roll_no = %payload.roll_no))]
pub async fn register_student(
    state: web::Data<AppState>,
    config: web::Data<Config>,
    payload: web::Json<CreateStudent>,
) -> Result<HttpResponse, AppError> {
    let input = payload.normalized()?;

    if !is_roll_number_available(&state, &input.roll_no).await? {
        return Err(AppError::DuplicateRollNumber);
    }

    let student = Student::new(input.name, input.roll_no, input.class, Utc::now());

    // A concurrent registration can still win between the check and the insert
    state.store.insert_student(&student).await.map_err(|e| {
        if e.is_unique_violation() {
            AppError::DuplicateRollNumber
        } else {
            AppError::store("Failed to register student. Please try again.")(e)
        }
    })?;

    state.roll_numbers.insert(&student.roll_no);
    state.students.insert(student.clone()).await;
    info!(student_id = %student.id, "Student registered");

    Ok(HttpResponse::Created().json(RegisteredStudent {
        qr: QrLinks::for_student(&config.api_prefix, &student),
        student,
        notification: Notification::success("Success", "Student registered successfully!"),
    }))
}

async fn load_student(state: &AppState, id: &str) -> Result<Student, AppError> {
    state
        .students
        .get_or_load(state.store.as_ref(), &id.to_lowercase())
        .await
        .map_err(AppError::store("Failed to load student"))?
        .ok_or(AppError::StudentNotFound)
}

/// Get student by id
#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id", Path, description = "Student id")),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found", body = Notification),
        (status = 500, description = "Internal server error", body = Notification)
    ),
    tag = "Students"
)]
pub async fn get_student(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let student = load_student(&state, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(student))
}

/// QR code image for a student
#[utoipa::path(
    get,
    path = "/api/students/{id}/qr",
    params(("id", Path, description = "Student id"), QrQuery),
    responses(
        (status = 200, description = "PNG image encoding the student id"),
        (status = 404, description = "Student not found", body = Notification),
        (status = 500, description = "QR generation failed", body = Notification)
    ),
    tag = "Students"
)]
pub async fn student_qr(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<QrQuery>,
) -> Result<HttpResponse, AppError> {
    let student = load_student(&state, &path.into_inner()).await?;
    let size = query.size.unwrap_or_default();

    let id = student.id.clone();
    let png = web::block(move || qr::render_png(&id, size.width_px()))
        .await
        .map_err(|e| AppError::QrRender(e.to_string()))??;

    let mut response = HttpResponse::Ok();
    response.content_type("image/png");
    if size == QrSize::Download {
        response.insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(qr::download_filename(&student))],
        });
    }
    Ok(response.body(png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{StaleReadStore, register, test_app, test_app_with_store};
    use actix_web::http::{StatusCode, header};
    use std::sync::Arc;
    use actix_web::test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn register_returns_student_and_qr_links() {
        let (app, _) = test_app().await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .set_json(json!({"name": " Asha Rao ", "roll_no": "CS-042", "class": "10-A"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["student"]["name"], "Asha Rao");
        assert_eq!(body["notification"]["description"], "Student registered successfully!");
        let id = body["student"]["id"].as_str().unwrap();
        assert_eq!(body["qr"]["display_url"], format!("/api/students/{id}/qr?size=display"));
        assert_eq!(body["qr"]["download_filename"], "Asha Rao_CS-042_QR.png");
    }

    #[actix_web::test]
    async fn duplicate_roll_number_is_reported_distinctly() {
        let (app, _) = test_app().await;
        register(&app, "Asha", "CS-042", "10-A").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .set_json(json!({"name": "Ravi", "roll_no": "CS-042", "class": "10-B"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["description"], "Roll number already exists!");
        assert_eq!(body["variant"], "destructive");
    }

    #[actix_web::test]
    async fn insert_conflict_after_a_stale_check_is_a_duplicate() {
        let (app, state) = test_app_with_store(Arc::new(StaleReadStore::default())).await;
        register(&app, "Asha", "CS-042", "10-A").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .set_json(json!({"name": "Ravi", "roll_no": "cs-042", "class": "10-B"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["description"], "Roll number already exists!");
        assert_eq!(state.store.roll_numbers().await.unwrap(), ["CS-042"]);
    }

    #[actix_web::test]
    async fn empty_fields_are_rejected() {
        let (app, _) = test_app().await;

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/students")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .set_json(json!({"name": "Asha", "roll_no": "  ", "class": "10-A"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["description"], "Roll number is required");
    }

    #[actix_web::test]
    async fn get_student_by_id_and_unknown_id() {
        let (app, _) = test_app().await;
        let student = register(&app, "Asha", "CS-042", "10-A").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/students/{}", student.id.to_uppercase()))
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let found: Student = test::read_body_json(resp).await;
        assert_eq!(found, student);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/students/5f1c2a9e-3b7d-4c1e-9a2f-0d6e8b4c7a11")
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn qr_download_is_a_named_png_attachment() {
        let (app, _) = test_app().await;
        let student = register(&app, "Asha", "CS-042", "10-A").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/students/{}/qr?size=download", student.id))
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("attachment"));
        assert!(disposition.contains("Asha_CS-042_QR.png"));

        let png = test::read_body(resp).await;
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!(img.width(), 512);
    }

    #[actix_web::test]
    async fn qr_display_is_inline() {
        let (app, _) = test_app().await;
        let student = register(&app, "Asha", "CS-042", "10-A").await;

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/students/{}/qr", student.id))
                .peer_addr("127.0.0.1:40000".parse().unwrap())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::CONTENT_DISPOSITION).is_none());
        let png = test::read_body(resp).await;
        assert_eq!(image::load_from_memory(&png).unwrap().width(), 256);
    }
}
