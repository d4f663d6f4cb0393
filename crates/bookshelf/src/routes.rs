//! Router assembly.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::auth::guard::LOGIN_REQUIRED;
use crate::auth::{enforce, Gate};
use crate::handlers::{self, admin, auth, join, pages, profile, search};
use crate::session::session_layer;
use crate::state::AppState;

/// Build the application router with all routes.
///
/// Guards are attached per route, inside the session layer, so a rejected
/// visitor never reaches the handler.
pub fn build_router(state: AppState) -> Router {
    let admins = state.admins.clone();

    // Health check routes (no session)
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health));

    let public_routes = Router::new()
        .route("/", get(pages::home))
        .route("/login", get(pages::login))
        .route("/about", get(pages::about))
        .route("/team", get(pages::team))
        .route("/contact", get(pages::contact))
        .route("/supporters", get(pages::supporters))
        .route("/explore", get(auth::explore))
        .route("/sessionLogin", post(auth::session_login))
        .route("/logout", get(auth::logout));

    let member_routes = Router::new()
        .route(
            "/search",
            get(search::search).layer(middleware::from_fn_with_state(
                Gate::session(admins.clone(), search::SEARCH_LOGIN),
                enforce,
            )),
        )
        .route(
            "/profile",
            get(profile::show)
                .post(profile::update)
                .layer(middleware::from_fn_with_state(
                    Gate::session(admins.clone(), LOGIN_REQUIRED),
                    enforce,
                )),
        )
        .route(
            "/join",
            get(join::form)
                .post(join::submit)
                .layer(middleware::from_fn_with_state(
                    Gate::session(admins.clone(), join::JOIN_LOGIN),
                    enforce,
                )),
        )
        .route(
            "/admin",
            get(admin::panel).layer(middleware::from_fn_with_state(Gate::admin(admins), enforce)),
        );

    let session_routes = Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_layer,
        ));

    Router::new()
        .merge(health_routes)
        .merge(session_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, Response, StatusCode,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{DecodedIdentity, IdentityError, IdentityVerifier};
    use crate::config::AppConfig;
    use crate::services::join::SHEET_WRITE_FAILED;
    use crate::session::{SessionConfig, SessionManager};
    use crate::state::Collaborators;
    use crate::store::{
        JoinBackup, JoinSubmission, MemoryProfileStore, ProfileRecord, ProfileStore, SheetSink, StoreError,
    };

    const ADMIN: &str = "admin@example.com";
    const READER: &str = "reader@example.com";

    /// Accepts `token:<email>` and names every user "Asha".
    struct StubVerifier;

    #[async_trait]
    impl IdentityVerifier for StubVerifier {
        async fn verify(&self, id_token: &str) -> Result<DecodedIdentity, IdentityError> {
            match id_token.strip_prefix("token:") {
                Some(email) => Ok(DecodedIdentity {
                    uid: Some(format!("uid-{}", email)),
                    email: Some(email.to_string()),
                    name: Some("Asha".to_string()),
                }),
                None => Err(IdentityError::Rejected("bad token".to_string())),
            }
        }
    }

    /// Memory store that counts listings.
    #[derive(Clone, Default)]
    struct CountingProfiles {
        inner: MemoryProfileStore,
        lists: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ProfileStore for CountingProfiles {
        async fn get(&self, name: &str) -> Result<Option<ProfileRecord>, StoreError> {
            self.inner.get(name).await
        }

        async fn put(&self, record: &ProfileRecord) -> Result<(), StoreError> {
            self.inner.put(record).await
        }

        async fn list(&self) -> Result<Vec<ProfileRecord>, StoreError> {
            self.lists.fetch_add(1, Ordering::SeqCst);
            self.inner.list().await
        }
    }

    /// Sheet that refuses every append.
    struct RefusingSheet;

    #[async_trait]
    impl SheetSink for RefusingSheet {
        async fn append(&self, _submission: &JoinSubmission) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }

        async fn rows(&self) -> Result<Vec<JoinSubmission>, StoreError> {
            Ok(Vec::new())
        }
    }

    struct TestApp {
        router: Router,
        profiles: CountingProfiles,
        sessions: SessionManager,
        backup: JoinBackup,
        dir: tempfile::TempDir,
    }

    impl TestApp {
        fn new() -> Self {
            Self::with_sheet(None)
        }

        fn with_sheet(sheet: Option<Arc<dyn SheetSink>>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = AppConfig {
                admin_emails: ADMIN.to_string(),
                catalog_path: dir.path().join("books.csv").display().to_string(),
                join_backup_path: dir.path().join("join_data.csv").display().to_string(),
                ..AppConfig::default()
            };
            let session_config = SessionConfig {
                secret_key: "test-secret".to_string(),
                ..SessionConfig::default()
            };
            let profiles = CountingProfiles::default();
            let collaborators = Collaborators {
                identity: Arc::new(StubVerifier),
                profiles: Arc::new(profiles.clone()),
                sheet,
                ..Collaborators::offline()
            };

            let backup = JoinBackup::new(&config.join_backup_path);
            let state = AppState::new(config, session_config, collaborators);
            let sessions = state.sessions.clone();

            Self {
                router: build_router(state),
                profiles,
                sessions,
                backup,
                dir,
            }
        }

        fn catalog_path(&self) -> std::path::PathBuf {
            self.dir.path().join("books.csv")
        }

        async fn send(&self, request: Request<Body>) -> Response<Body> {
            self.router.clone().oneshot(request).await.unwrap()
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
            let mut builder = Request::get(uri);
            if let Some(cookie) = cookie {
                builder = builder.header(COOKIE, cookie);
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }

        async fn post_form(&self, uri: &str, cookie: Option<&str>, form: &str) -> Response<Body> {
            let mut builder = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
            if let Some(cookie) = cookie {
                builder = builder.header(COOKIE, cookie);
            }
            self.send(builder.body(Body::from(form.to_string())).unwrap()).await
        }

        async fn post_login(&self, cookie: Option<&str>, body: &str) -> Response<Body> {
            let mut builder = Request::post("/sessionLogin").header(CONTENT_TYPE, "application/json");
            if let Some(cookie) = cookie {
                builder = builder.header(COOKIE, cookie);
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap()).await
        }

        /// Sign in and return the `Cookie` header for later requests.
        async fn login(&self, email: &str) -> String {
            let response = self
                .post_login(None, &login_body(email))
                .await;
            assert_eq!(response.status(), StatusCode::OK);
            cookie_of(&response)
        }
    }

    fn login_body(email: &str) -> String {
        json!({ "idToken": format!("token:{}", email) }).to_string()
    }

    fn cookie_of(response: &Response<Body>) -> String {
        let header = response.headers()[SET_COOKIE].to_str().unwrap();
        header.split(';').next().unwrap().to_string()
    }

    fn location(response: &Response<Body>) -> &str {
        response.headers()[LOCATION].to_str().unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn messages(page: &Value) -> Vec<String> {
        page["notices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["message"].as_str().unwrap().to_string())
            .collect()
    }

    async fn backup_rows(path: &Path) -> usize {
        JoinBackup::new(path).rows().await.unwrap().len()
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let response = app.get("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");

        let detail = body_json(app.get("/api/health", None).await).await;
        assert_eq!(detail["backends"]["profiles"], "memory");
        assert_eq!(detail["catalog"], false);
    }

    #[tokio::test]
    async fn test_static_page_sets_cookie() {
        let app = TestApp::new();
        let response = app.get("/about", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(cookie_of(&response).starts_with("bookshelf_session="));

        let page = body_json(response).await;
        assert_eq!(page["view"], "about");
        assert!(page["session"].is_null());
    }

    #[tokio::test]
    async fn test_search_requires_session() {
        let app = TestApp::new();
        let response = app.get("/search?q=gita", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let cookie = cookie_of(&response);
        let page = body_json(app.get("/login", Some(&cookie)).await).await;
        assert_eq!(messages(&page), vec!["Please login to use search functionality!"]);
    }

    #[tokio::test]
    async fn test_guarded_join_post_does_not_write() {
        let app = TestApp::new();
        let response = app
            .post_form("/join", None, "name=Ravi&email=r%40example.com&mobile=1&city=Pune")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
        assert_eq!(backup_rows(app.backup.path()).await, 0);
    }

    #[tokio::test]
    async fn test_login_rejects_bad_tokens() {
        let app = TestApp::new();

        for body in ["not json", "{}", r#"{"idToken":"forged"}"#] {
            let response = app.post_login(None, body).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let cookie = cookie_of(&response);
            assert_eq!(
                body_json(response).await,
                json!({ "ok": false, "error": "Invalid token" })
            );

            let home = body_json(app.get("/", Some(&cookie)).await).await;
            assert!(home["session"].is_null());
        }
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;

        let home = body_json(app.get("/", Some(&cookie)).await).await;
        assert_eq!(home["session"]["user"], READER);
        assert_eq!(home["session"]["name"], "Asha");
        assert_eq!(messages(&home), vec!["Logged in successfully."]);

        let response = app.get("/logout", Some(&cookie)).await;
        assert_eq!(location(&response), "/");

        let home = body_json(app.get("/", Some(&cookie)).await).await;
        assert!(home["session"].is_null());
        assert_eq!(messages(&home), vec!["Logged out successfully."]);

        let response = app.get("/search", Some(&cookie)).await;
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_login_moves_visitor_to_new_session_id() {
        let app = TestApp::new();
        let before = cookie_of(&app.get("/", None).await);

        let response = app.post_login(Some(&before), &login_body(ADMIN)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 1);
        let after = cookie_of(&response);
        assert_ne!(after, before);

        let home = body_json(app.get("/", Some(&before)).await).await;
        assert!(home["session"].is_null());
        let response = app.get("/admin", Some(&before)).await;
        assert_eq!(location(&response), "/login");

        let home = body_json(app.get("/", Some(&after)).await).await;
        assert_eq!(home["session"]["user"], ADMIN);
        assert_eq!(messages(&home), vec!["Logged in successfully."]);
    }

    #[tokio::test]
    async fn test_cookieless_login_sets_a_single_cookie() {
        let app = TestApp::new();
        let response = app.post_login(None, &login_body(READER)).await;
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_unclaimed_redirect_notices_are_pruned() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;
        for _ in 0..20 {
            let response = app.get("/search", None).await;
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }
        assert_eq!(app.sessions.store.len().await, 21);

        let config = &app.sessions.config;
        let removed = app
            .sessions
            .store
            .prune_idle(config.idle_timeout, std::time::Duration::ZERO)
            .await;
        assert_eq!(removed, 20);

        let home = body_json(app.get("/", Some(&cookie)).await).await;
        assert_eq!(home["session"]["user"], READER);
    }

    #[tokio::test]
    async fn test_tampered_cookie_is_a_new_visitor() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;
        let tampered = format!("{}0", cookie);

        let response = app.get("/search", Some(&tampered)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_ne!(cookie_of(&response), cookie);
    }

    #[tokio::test]
    async fn test_explore_redirects() {
        let app = TestApp::new();
        let response = app.get("/explore", None).await;
        assert_eq!(location(&response), "/login");
        let page = body_json(app.get("/login", Some(&cookie_of(&response))).await).await;
        assert_eq!(messages(&page), vec!["Please login to explore books."]);

        let cookie = app.login(READER).await;
        let response = app.get("/explore", Some(&cookie)).await;
        assert_eq!(location(&response), "/search");
    }

    #[tokio::test]
    async fn test_search_pages_catalog() {
        let app = TestApp::new();
        let mut csv = String::from("Name Of Book,Writter Name,Langauge/ Script,Topic\n");
        csv.push_str("Gita,Vyasa,Sanskrit,Religion\nRamayana,Valmiki,Sanskrit,Epic\n");
        tokio::fs::write(app.catalog_path(), csv).await.unwrap();

        let cookie = app.login(READER).await;
        let page = body_json(app.get("/search?q=SANSKRIT&topic=Epic&page=abc", Some(&cookie)).await).await;

        assert_eq!(page["total"], 1);
        assert_eq!(page["page"], 1);
        assert_eq!(page["per_page"], 10);
        assert_eq!(page["results"][0]["title"], "Ramayana");
        assert_eq!(page["topics"], json!(["Epic", "Religion"]));
    }

    #[tokio::test]
    async fn test_search_body_has_one_page_key() {
        let app = TestApp::new();
        let mut csv = String::from("Name Of Book,Writter Name,Langauge/ Script,Topic\n");
        for i in 0..15 {
            csv.push_str(&format!("Book {i},Author,Sanskrit,Epic\n"));
        }
        tokio::fs::write(app.catalog_path(), csv).await.unwrap();
        let cookie = app.login(READER).await;

        let response = app.get("/search?page=2", Some(&cookie)).await;
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(raw.matches("\"page\":").count(), 1);

        let page: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(page["view"], "search");
        assert_eq!(page["page"], 2);
        assert_eq!(page["results"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_padded_catalog_topic_filter() {
        let app = TestApp::new();
        let csv = "Name Of Book, Writter Name, Langauge/ Script, Topic\n\
                   Gita, Vyasa, Sanskrit, Religion\n\
                   Ramayana, Valmiki, Sanskrit, Epic \n";
        tokio::fs::write(app.catalog_path(), csv).await.unwrap();
        let cookie = app.login(READER).await;

        let page = body_json(app.get("/search", Some(&cookie)).await).await;
        assert_eq!(page["topics"], json!(["Epic", "Religion"]));

        let page = body_json(app.get("/search?topic=Religion", Some(&cookie)).await).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["results"][0]["title"], "Gita");
        assert_eq!(page["results"][0]["author"], "Vyasa");
    }

    #[tokio::test]
    async fn test_search_without_catalog_warns() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;
        let _ = app.get("/", Some(&cookie)).await;

        let page = body_json(app.get("/search", Some(&cookie)).await).await;
        assert_eq!(page["total"], 0);
        assert_eq!(page["results"], json!([]));
        assert_eq!(page["notices"][0]["level"], "warning");
        assert_eq!(messages(&page), vec!["Books database not found!"]);
    }

    #[tokio::test]
    async fn test_admin_rejects_non_admin_without_running_handler() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;

        let response = app.get("/admin", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(app.profiles.lists.load(Ordering::SeqCst), 0);

        let home = body_json(app.get("/", Some(&cookie)).await).await;
        assert!(messages(&home).contains(&"You are not authorized to view the admin panel.".to_string()));
    }

    #[tokio::test]
    async fn test_admin_panel_for_admin() {
        let app = TestApp::new();
        let cookie = app.login(ADMIN).await;
        let _ = app.get("/", Some(&cookie)).await;

        let response = app.get("/admin", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.profiles.lists.load(Ordering::SeqCst), 1);

        let page = body_json(response).await;
        assert_eq!(page["profiles"], json!([]));
        assert_eq!(page["submissions"], json!([]));
        assert_eq!(messages(&page), vec!["Submitted entries are unavailable."]);
    }

    #[tokio::test]
    async fn test_join_without_sheet_adds_one_local_row() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;
        let before = backup_rows(app.backup.path()).await;

        let response = app
            .post_form("/join", Some(&cookie), "name=Ravi&email=ravi%40example.com&mobile=12345&city=Indore")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(backup_rows(app.backup.path()).await, before + 1);

        let home = body_json(app.get("/", Some(&cookie)).await).await;
        let notices = messages(&home);
        assert!(notices.contains(&"Thank you for joining! Your information has been saved.".to_string()));
        assert_eq!(home["notices"][2]["level"], "warning");
    }

    #[tokio::test]
    async fn test_join_sheet_failure_keeps_local_row() {
        let app = TestApp::with_sheet(Some(Arc::new(RefusingSheet)));
        let cookie = app.login(READER).await;

        let response = app
            .post_form("/join", Some(&cookie), "name=Ravi&email=ravi%40example.com&mobile=12345&city=Indore")
            .await;
        assert_eq!(location(&response), "/");
        assert_eq!(backup_rows(app.backup.path()).await, 1);

        let home = body_json(app.get("/", Some(&cookie)).await).await;
        assert_eq!(
            messages(&home),
            vec![
                "Logged in successfully.".to_string(),
                "Thank you for joining! Your information has been saved.".to_string(),
                SHEET_WRITE_FAILED.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_join_missing_fields_is_422() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;

        let response = app.post_form("/join", Some(&cookie), "name=Ravi&email=").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["status"], 422);
        assert_eq!(body["error"], "Missing required fields: email, mobile, city");
        assert_eq!(backup_rows(app.backup.path()).await, 0);
    }

    #[tokio::test]
    async fn test_profile_get_is_idempotent() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;

        let first = body_json(app.get("/profile", Some(&cookie)).await).await;
        let second = body_json(app.get("/profile", Some(&cookie)).await).await;

        assert_eq!(first["profile"], second["profile"]);
        assert_eq!(
            first["profile"],
            json!({ "name": "Asha", "email": READER, "mobile": "", "dob": "", "qualification": "" })
        );
        assert_eq!(app.profiles.inner.len().await, 0);
    }

    #[tokio::test]
    async fn test_profile_rename_orphans_old_record() {
        let app = TestApp::new();
        let cookie = app.login(READER).await;

        let response = app
            .post_form("/profile", Some(&cookie), "name=Asha&mobile=111&dob=2000-01-01&qualification=BA")
            .await;
        assert_eq!(location(&response), "/profile");

        let response = app
            .post_form("/profile", Some(&cookie), "name=Asha%20K&mobile=222&dob=2000-01-01&qualification=MA")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        assert_eq!(app.profiles.inner.len().await, 2);
        let page = body_json(app.get("/profile", Some(&cookie)).await).await;
        assert_eq!(page["profile"]["name"], "Asha");
        assert_eq!(page["profile"]["mobile"], "111");
        assert_eq!(page["profile"]["email"], READER);
    }
}
