use crate::data::{SessionEntry, Student, Teacher};
use crate::scheduler::generate_schedule;
use crate::slots::SlotCatalog;
use crate::store::{Store, StoreError, StudentRecord, TeacherRecord};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use itertools::Itertools;
use std::sync::{Arc, Mutex};

type SharedStore = Arc<Mutex<Store>>;

fn store_error(err: StoreError) -> (StatusCode, String) {
    let status = match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

async fn list_teachers(State(store): State<SharedStore>) -> Json<Vec<TeacherRecord>> {
    Json(store.lock().unwrap().teachers())
}

async fn add_teacher(
    State(store): State<SharedStore>,
    Json(teacher): Json<Teacher>,
) -> Result<(StatusCode, Json<TeacherRecord>), (StatusCode, String)> {
    let record = store
        .lock()
        .unwrap()
        .add_teacher(teacher)
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_teacher(
    Path(id): Path<String>,
    State(store): State<SharedStore>,
    Json(teacher): Json<Teacher>,
) -> Result<Json<TeacherRecord>, (StatusCode, String)> {
    let record = store
        .lock()
        .unwrap()
        .update_teacher(&id, teacher)
        .map_err(store_error)?;
    Ok(Json(record))
}

async fn delete_teacher(
    Path(id): Path<String>,
    State(store): State<SharedStore>,
) -> Result<StatusCode, (StatusCode, String)> {
    store
        .lock()
        .unwrap()
        .delete_teacher(&id)
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_students(State(store): State<SharedStore>) -> Json<Vec<StudentRecord>> {
    Json(store.lock().unwrap().students())
}

async fn add_student(
    State(store): State<SharedStore>,
    Json(student): Json<Student>,
) -> Result<(StatusCode, Json<StudentRecord>), (StatusCode, String)> {
    let record = store
        .lock()
        .unwrap()
        .add_student(student)
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update_student(
    Path(id): Path<String>,
    State(store): State<SharedStore>,
    Json(student): Json<Student>,
) -> Result<Json<StudentRecord>, (StatusCode, String)> {
    let record = store
        .lock()
        .unwrap()
        .update_student(&id, student)
        .map_err(store_error)?;
    Ok(Json(record))
}

async fn delete_student(
    Path(id): Path<String>,
    State(store): State<SharedStore>,
) -> Result<StatusCode, (StatusCode, String)> {
    store
        .lock()
        .unwrap()
        .delete_student(&id)
        .map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_schedule(State(store): State<SharedStore>) -> Json<Vec<SessionEntry>> {
    Json(store.lock().unwrap().schedule())
}

/// Runs the scheduler over the stored roster; on success the schedule is
/// persisted and returned, on failure the previous schedule is untouched.
async fn generate(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<SessionEntry>>, (StatusCode, String)> {
    let store = store.lock().unwrap();
    let duplicates = store.duplicate_teacher_names();
    if !duplicates.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "duplicate teacher names in store: {}",
                duplicates.iter().join(", ")
            ),
        ));
    }
    let teachers: Vec<Teacher> = store.teachers().into_iter().map(|r| r.teacher).collect();
    let students: Vec<Student> = store.students().into_iter().map(|r| r.student).collect();
    let schedule = generate_schedule(&SlotCatalog::default(), &teachers, &students)
        .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?;
    store.save_schedule(&schedule).map_err(store_error)?;
    Ok(Json(schedule))
}

async fn clear_data(
    State(store): State<SharedStore>,
) -> Result<StatusCode, (StatusCode, String)> {
    store.lock().unwrap().clear().map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/teachers", get(list_teachers).post(add_teacher))
        .route(
            "/api/teachers/:id",
            put(update_teacher).delete(delete_teacher),
        )
        .route("/api/students", get(list_students).post(add_student))
        .route(
            "/api/students/:id",
            put(update_student).delete(delete_student),
        )
        .route("/api/schedule", get(get_schedule))
        .route("/api/generate-schedule", post(generate))
        .route("/api/clear-data", post(clear_data))
        .with_state(store)
}

pub async fn run_server(data_dir: &str) -> std::io::Result<()> {
    let store = Store::open(data_dir)?;
    let app = router(Arc::new(Mutex::new(store)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;

    println!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
