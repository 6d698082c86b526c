//! Task CRUD and ownership tests against a live Postgres. Ignored by default;
//! run with a migrated database and `DATABASE_URL=... cargo test -- --ignored`.

use actix_web::{http::header, rt, test, web, App, HttpServer};
use dotenv::dotenv;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::net::TcpListener;

use tasknest::auth::{AccessGuard, AuthResponse};
use tasknest::config::Config;
use tasknest::error;
use tasknest::routes;

const TEST_SECRET: &str = "integration-test-secret";

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

fn test_config(database_url: String) -> Config {
    Config {
        database_url,
        jwt_secret: TEST_SECRET.to_string(),
        server_port: 0,
        server_host: "127.0.0.1".to_string(),
    }
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(test_config(
                    std::env::var("DATABASE_URL").unwrap(),
                )))
                .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
                .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AccessGuard)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query(
        "DELETE FROM tasks WHERE owner_id IN (SELECT id FROM users WHERE email = $1)",
    )
    .bind(email)
    .execute(pool)
    .await;
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/user/register")
        .set_json(&json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Failed to register {}. Body: {}",
        email,
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("Failed to parse registration response")
}

#[ignore = "requires a running Postgres (DATABASE_URL)"]
#[actix_rt::test]
async fn test_task_crud_flow() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let email = "crud_user@example.com";
    cleanup_user(&pool, email).await;
    let user = register_user(&app, "Ann", email, "password1").await;

    // Create: completed omitted defaults to false, priority given as "Low"
    let req_create = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(&json!({ "title": "Buy milk", "priority": "Low" }))
        .to_request();
    let resp_create = test::call_service(&app, req_create).await;
    assert_eq!(resp_create.status(), actix_web::http::StatusCode::CREATED);
    let created: Value = test::read_body_json(resp_create).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["task"]["title"], "Buy milk");
    assert_eq!(created["task"]["priority"], "Low");
    assert_eq!(created["task"]["completed"], false);
    assert_eq!(created["task"]["owner"], json!(user.user.id));
    let task_id = created["task"]["id"].as_str().unwrap().to_string();

    // Get by id
    let req_get = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp_get = test::call_service(&app, req_get).await;
    assert_eq!(resp_get.status(), actix_web::http::StatusCode::OK);
    let fetched: Value = test::read_body_json(resp_get).await;
    assert_eq!(fetched["task"]["id"].as_str().unwrap(), task_id);

    // Toggle completion with the textual wire form
    let req_update = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(&json!({ "completed": "Yes" }))
        .to_request();
    let resp_update = test::call_service(&app, req_update).await;
    assert_eq!(resp_update.status(), actix_web::http::StatusCode::OK);
    let updated: Value = test::read_body_json(resp_update).await;
    assert_eq!(updated["task"]["completed"], true);
    // Untouched fields keep their values
    assert_eq!(updated["task"]["title"], "Buy milk");

    // Idempotence: the same partial payload again yields the same stored state
    let req_update_again = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(&json!({ "completed": "Yes" }))
        .to_request();
    let resp_update_again = test::call_service(&app, req_update_again).await;
    assert_eq!(resp_update_again.status(), actix_web::http::StatusCode::OK);
    let updated_again: Value = test::read_body_json(resp_update_again).await;
    assert_eq!(updated_again["task"], updated["task"]);

    // "No" switches it back to a strict false
    let req_no = test::TestRequest::put()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(&json!({ "completed": "no" }))
        .to_request();
    let resp_no = test::call_service(&app, req_no).await;
    let toggled: Value = test::read_body_json(resp_no).await;
    assert_eq!(toggled["task"]["completed"], false);

    // List: second task appears first (newest-created first)
    let req_create2 = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .set_json(&json!({ "title": "Walk dog", "completed": "Yes" }))
        .to_request();
    let created2: Value =
        test::read_body_json(test::call_service(&app, req_create2).await).await;
    assert_eq!(created2["task"]["completed"], true);

    let req_list = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp_list = test::call_service(&app, req_list).await;
    assert_eq!(resp_list.status(), actix_web::http::StatusCode::OK);
    let listed: Value = test::read_body_json(resp_list).await;
    let tasks = listed["task"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["title"], "Walk dog");
    assert_eq!(tasks[1]["title"], "Buy milk");

    // Delete, then the task is gone
    let req_delete = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp_delete = test::call_service(&app, req_delete).await;
    assert_eq!(resp_delete.status(), actix_web::http::StatusCode::OK);

    let req_get_deleted = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp_get_deleted = test::call_service(&app, req_get_deleted).await;
    assert_eq!(
        resp_get_deleted.status(),
        actix_web::http::StatusCode::NOT_FOUND
    );

    // A path id that is not a UUID is a validation failure, with the envelope
    let req_bad_id = test::TestRequest::get()
        .uri("/api/tasks/not-a-uuid")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user.token)))
        .to_request();
    let resp_bad_id = test::call_service(&app, req_bad_id).await;
    assert_eq!(resp_bad_id.status(), actix_web::http::StatusCode::BAD_REQUEST);
    let bad_id_body: Value = test::read_body_json(resp_bad_id).await;
    assert_eq!(bad_id_body["success"], false);

    cleanup_user(&pool, email).await;
}

#[ignore = "requires a running Postgres (DATABASE_URL)"]
#[actix_rt::test]
async fn test_task_ownership_isolation() {
    let pool = test_pool().await;
    let app = test_app!(pool);

    let email_a = "owner_a@example.com";
    let email_b = "owner_b@example.com";
    cleanup_user(&pool, email_a).await;
    cleanup_user(&pool, email_b).await;

    let user_a = register_user(&app, "Owner A", email_a, "password-a1").await;
    let user_b = register_user(&app, "Owner B", email_b, "password-b1").await;

    let req_create = test::TestRequest::post()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user_a.token)))
        .set_json(&json!({ "title": "A's task", "priority": "High" }))
        .to_request();
    let created: Value = test::read_body_json(test::call_service(&app, req_create).await).await;
    let task_a_id = created["task"]["id"].as_str().unwrap().to_string();

    // B's list never contains A's task
    let req_list_b = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user_b.token)))
        .to_request();
    let listed_b: Value = test::read_body_json(test::call_service(&app, req_list_b).await).await;
    assert!(listed_b["task"].as_array().unwrap().is_empty());

    // For B, A's task id and a random id must be indistinguishable,
    // status and body alike, on every operation.
    let random_id = uuid::Uuid::new_v4().to_string();
    for id in [task_a_id.as_str(), random_id.as_str()] {
        let req_get = test::TestRequest::get()
            .uri(&format!("/api/tasks/{}", id))
            .append_header((header::AUTHORIZATION, format!("Bearer {}", user_b.token)))
            .to_request();
        let resp_get = test::call_service(&app, req_get).await;
        assert_eq!(resp_get.status(), actix_web::http::StatusCode::NOT_FOUND);

        let req_update = test::TestRequest::put()
            .uri(&format!("/api/tasks/{}", id))
            .append_header((header::AUTHORIZATION, format!("Bearer {}", user_b.token)))
            .set_json(&json!({ "title": "hijack attempt" }))
            .to_request();
        let resp_update = test::call_service(&app, req_update).await;
        assert_eq!(resp_update.status(), actix_web::http::StatusCode::NOT_FOUND);

        let req_delete = test::TestRequest::delete()
            .uri(&format!("/api/tasks/{}", id))
            .append_header((header::AUTHORIZATION, format!("Bearer {}", user_b.token)))
            .to_request();
        let resp_delete = test::call_service(&app, req_delete).await;
        assert_eq!(resp_delete.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    // Bodies for "someone else's task" and "no such task" are identical
    let req_owned = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_a_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user_b.token)))
        .to_request();
    let body_owned = test::read_body(test::call_service(&app, req_owned).await).await;
    let req_random = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", random_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user_b.token)))
        .to_request();
    let body_random = test::read_body(test::call_service(&app, req_random).await).await;
    assert_eq!(body_owned, body_random);

    // A still sees and owns the task
    let req_get_a = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task_a_id))
        .append_header((header::AUTHORIZATION, format!("Bearer {}", user_a.token)))
        .to_request();
    assert_eq!(
        test::call_service(&app, req_get_a).await.status(),
        actix_web::http::StatusCode::OK
    );

    cleanup_user(&pool, email_a).await;
    cleanup_user(&pool, email_b).await;
}

#[ignore = "requires a running Postgres (DATABASE_URL)"]
#[actix_rt::test]
async fn test_create_task_unauthorized_over_http() {
    let pool = test_pool().await;

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server_pool = pool.clone();
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
                .app_data(web::Data::new(test_config(
                    std::env::var("DATABASE_URL").unwrap(),
                )))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AccessGuard)
                        .configure(routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/api/tasks", port))
        .json(&json!({ "title": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    server_handle.abort();
}
