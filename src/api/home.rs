use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::Config;

#[derive(Serialize, ToSchema)]
pub struct Section {
    #[schema(example = "Generate QR Codes")]
    pub title: String,
    pub description: String,
    #[schema(example = "POST /api/students")]
    pub entry_point: String,
}

#[derive(Serialize, ToSchema)]
pub struct HomeResponse {
    #[schema(example = "QR Attendance")]
    pub name: String,
    pub sections: Vec<Section>,
}

/// Entry points for the three screens
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service overview", body = HomeResponse)),
    tag = "Home"
)]
#[get("/")]
pub async fn index(config: web::Data<Config>) -> impl Responder {
    let prefix = config.api_prefix.trim_end_matches('/');

    HttpResponse::Ok().json(HomeResponse {
        name: "QR Attendance".to_string(),
        sections: vec![
            Section {
                title: "Generate QR Codes".to_string(),
                description: "Register new students and generate their unique QR codes for attendance".to_string(),
                entry_point: format!("POST {prefix}/students"),
            },
            Section {
                title: "Scan QR Codes".to_string(),
                description: "Scan student QR codes to mark attendance quickly and efficiently".to_string(),
                entry_point: format!("POST {prefix}/scan"),
            },
            Section {
                title: "View Attendance".to_string(),
                description: "View detailed attendance records and generate reports".to_string(),
                entry_point: format!("GET {prefix}/attendance"),
            },
        ],
    })
}
