//! HTTP routes.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, DefaultBodyLimit, Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use inkworld_domain::{
    Character, ChoiceWithEndpoints, GrammarReport, InterventionDecision, NodeWithChoices, Story,
    StoryNode, StoryStructure, StyleEligibility, StyleProfile,
};
use inkworld_shared::{
    ApiResponse, ChatRequest, CreateCharacterRequest, CreateChoiceRequest, CreateNodeRequest,
    CreateStoryRequest, GenerateStyleRequest, GrammarRequest, InterventionRequest, LibraryPage,
    LibraryQuery, SpeechRequest, UpdateChoiceRequest, UpdateStoryRequest,
};
use serde_json::{json, Value};

use super::auth::{CurrentUser, OptionalUser};
use super::error::ApiError;
use super::extract::ValidatedJson;
use crate::app::App;
use crate::use_cases::style::StyledText;
use crate::use_cases::upload::{UploadError, UploadedFile, MAX_UPLOAD_BYTES};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Multipart framing on top of the largest accepted file.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/api/health", get(health))
        // Stories
        .route("/api/stories", get(list_stories).post(create_story))
        .route(
            "/api/stories/{id}",
            get(get_story).put(update_story).delete(delete_story),
        )
        .route("/api/library", get(library))
        // Story graph
        .route("/api/stories/{id}/convert", post(convert_story))
        .route("/api/stories/{id}/nodes", get(list_nodes).post(create_node))
        .route("/api/stories/{id}/choices", post(create_choice))
        .route(
            "/api/stories/{id}/choices/{choice_id}",
            post(record_choice_taken)
                .put(update_choice)
                .delete(delete_choice),
        )
        .route("/api/stories/{id}/structure", get(story_structure))
        // Characters
        .route(
            "/api/characters",
            get(list_characters).post(create_character),
        )
        .route("/api/story/{id}/live-characters", get(live_characters))
        // Assistant
        .route("/api/assistant/thread", post(create_thread))
        .route("/api/assistant/chat", post(chat))
        .route("/api/assistant/grammar", post(grammar))
        .route("/api/assistant/tts", post(text_to_speech))
        .route("/api/assistant/intervention", post(intervention))
        // Style
        .route(
            "/api/style/analyze",
            get(style_eligibility).post(analyze_style),
        )
        .route("/api/style/generate", post(generate_style))
        .route(
            "/api/style/profile",
            get(style_profile).delete(delete_style_profile),
        )
        // Uploads
        .route(
            "/api/upload",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

/// Malformed path ids are indistinguishable from missing resources.
fn path_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Stories
// =============================================================================

async fn list_stories(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Story>> {
    ok(app.use_cases.stories.list(user.id).await?)
}

async fn create_story(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<CreateStoryRequest>,
) -> ApiResult<Story> {
    ok(app.use_cases.stories.create(user.id, body).await?)
}

async fn get_story(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Story> {
    ok(app.use_cases.stories.get(user.id, path_id(&id)?).await?)
}

async fn update_story(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateStoryRequest>,
) -> ApiResult<Story> {
    ok(app
        .use_cases
        .stories
        .update(user.id, path_id(&id)?, body)
        .await?)
}

async fn delete_story(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    app.use_cases.stories.delete(user.id, path_id(&id)?).await?;
    ok(json!({ "deleted": true }))
}

async fn library(
    State(app): State<Arc<App>>,
    query: Result<Query<LibraryQuery>, QueryRejection>,
) -> ApiResult<LibraryPage> {
    let Query(query) = query.map_err(|e| ApiError::Validation(e.body_text()))?;
    ok(app.use_cases.stories.library(query).await?)
}

// =============================================================================
// Story graph
// =============================================================================

async fn convert_story(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StoryNode> {
    ok(app
        .use_cases
        .graph
        .convert_to_interactive(user.id, path_id(&id)?)
        .await?)
}

async fn list_nodes(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<NodeWithChoices>> {
    ok(app.use_cases.graph.list_nodes(user.id, path_id(&id)?).await?)
}

async fn create_node(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateNodeRequest>,
) -> ApiResult<NodeWithChoices> {
    ok(app
        .use_cases
        .graph
        .create_node(user.id, path_id(&id)?, body)
        .await?)
}

async fn create_choice(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<CreateChoiceRequest>,
) -> ApiResult<ChoiceWithEndpoints> {
    ok(app
        .use_cases
        .graph
        .create_choice(user.id, path_id(&id)?, body)
        .await?)
}

async fn update_choice(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path((id, choice_id)): Path<(String, String)>,
    ValidatedJson(body): ValidatedJson<UpdateChoiceRequest>,
) -> ApiResult<inkworld_domain::Choice> {
    ok(app
        .use_cases
        .graph
        .update_choice(user.id, path_id(&id)?, path_id(&choice_id)?, body)
        .await?)
}

async fn delete_choice(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path((id, choice_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    app.use_cases
        .graph
        .delete_choice(user.id, path_id(&id)?, path_id(&choice_id)?)
        .await?;
    ok(json!({ "deleted": true }))
}

/// Reader traffic; no session required.
async fn record_choice_taken(
    State(app): State<Arc<App>>,
    Path((_id, choice_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    app.use_cases
        .graph
        .record_choice_taken(path_id(&choice_id)?)
        .await?;
    ok(json!({ "recorded": true }))
}

async fn story_structure(
    State(app): State<Arc<App>>,
    OptionalUser(viewer): OptionalUser,
    Path(id): Path<String>,
) -> ApiResult<StoryStructure> {
    ok(app
        .use_cases
        .graph
        .structure(viewer.map(|u| u.id), path_id(&id)?)
        .await?)
}

// =============================================================================
// Characters
// =============================================================================

async fn list_characters(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<Character>> {
    ok(app.use_cases.characters.list(user.id).await?)
}

async fn create_character(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<CreateCharacterRequest>,
) -> ApiResult<Character> {
    ok(app.use_cases.characters.create(user.id, body).await?)
}

async fn live_characters(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<Character>> {
    ok(app
        .use_cases
        .characters
        .live_characters(user.id, path_id(&id)?)
        .await?)
}

// =============================================================================
// Assistant
// =============================================================================

async fn create_thread(
    State(app): State<Arc<App>>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Value> {
    let thread_id = app.use_cases.assistant.chat.create_thread().await?;
    ok(json!({ "threadId": thread_id }))
}

async fn chat(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<ChatRequest>,
) -> ApiResult<Value> {
    tracing::debug!(user_id = %user.id, thread_id = %body.thread_id, "Assistant chat message");
    let reply = app
        .use_cases
        .assistant
        .chat
        .post_message(&body.thread_id, &body.message)
        .await?;
    ok(json!({ "reply": reply }))
}

async fn grammar(
    State(app): State<Arc<App>>,
    CurrentUser(_user): CurrentUser,
    ValidatedJson(body): ValidatedJson<GrammarRequest>,
) -> ApiResult<GrammarReport> {
    ok(app.use_cases.assistant.grammar.review(body).await?)
}

async fn text_to_speech(
    State(app): State<Arc<App>>,
    CurrentUser(_user): CurrentUser,
    ValidatedJson(body): ValidatedJson<SpeechRequest>,
) -> Result<Response, ApiError> {
    let audio = app.use_cases.assistant.speech.synthesize(body).await?;
    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}

async fn intervention(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<InterventionRequest>,
) -> ApiResult<InterventionDecision> {
    ok(app
        .use_cases
        .assistant
        .intervention
        .evaluate(user.id, body)
        .await?)
}

// =============================================================================
// Style
// =============================================================================

async fn style_eligibility(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StyleEligibility> {
    ok(app.use_cases.style.eligibility(user.id).await?)
}

async fn analyze_style(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StyleProfile> {
    ok(app.use_cases.style.analyze(user.id).await?)
}

async fn generate_style(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<GenerateStyleRequest>,
) -> ApiResult<StyledText> {
    ok(app.use_cases.style.generate(user.id, body).await?)
}

async fn style_profile(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<StyleProfile> {
    ok(app.use_cases.style.profile(user.id).await?)
}

async fn delete_style_profile(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Value> {
    app.use_cases.style.delete_profile(user.id).await?;
    ok(json!({ "deleted": true }))
}

// =============================================================================
// Uploads
// =============================================================================

/// Reads the `file` part; other parts are ignored.
async fn upload_image(
    State(app): State<Arc<App>>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Value> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;
        file = Some(UploadedFile {
            content_type,
            file_name,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    let url = app.use_cases.upload.upload_image(file).await?;
    tracing::debug!(user_id = %user.id, url = %url, "Image uploaded");
    ok(json!({ "url": url }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{app_with_ai, app_with_session, MockAi, TestApp};
    use crate::infrastructure::ports::{AssistantRun, MessageRole, RunStatus, ThreadMessage};
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
    };
    use inkworld_domain::Voice;
    use tower::ServiceExt;

    struct Reply {
        status: StatusCode,
        content_type: Option<String>,
        bytes: Vec<u8>,
    }

    impl Reply {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.bytes).expect("json body")
        }
    }

    async fn send(
        test: &TestApp,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut builder = HttpRequest::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = routes()
            .with_state(test.app.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        Reply {
            status,
            content_type,
            bytes,
        }
    }

    async fn create_story(test: &TestApp, title: &str) -> String {
        let reply = send(
            test,
            "POST",
            "/api/stories",
            Some(&test.token),
            Some(json!({ "title": title, "content": "<p>Once upon a time</p>" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.json()["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_node(test: &TestApp, story_id: &str, title: &str, is_start: bool) -> String {
        let reply = send(
            test,
            "POST",
            &format!("/api/stories/{}/nodes", story_id),
            Some(&test.token),
            Some(json!({ "title": title, "content": "Go left or right", "isStart": is_start })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        reply.json()["data"]["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_public() {
        let test = app_with_session().await;
        let reply = send(&test, "GET", "/api/health", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.bytes, b"OK");
    }

    #[tokio::test]
    async fn authenticated_routes_reject_anonymous_callers() {
        let test = app_with_session().await;
        for (method, uri) in [
            ("GET", "/api/stories"),
            ("GET", "/api/characters"),
            ("POST", "/api/assistant/thread"),
            ("GET", "/api/style/profile"),
        ] {
            let reply = send(&test, method, uri, None, None).await;
            assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
            assert_eq!(reply.json()["code"], "UNAUTHORIZED");
        }
    }

    #[tokio::test]
    async fn story_crud_is_owner_only() {
        let test = app_with_session().await;
        let (_bo, bo_token) = test.add_user("Bo").await;
        let story_id = create_story(&test, "Mine").await;

        let reply = send(&test, "GET", &format!("/api/stories/{}", story_id), Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["data"]["wordCount"], 4);

        let reply = send(&test, "GET", &format!("/api/stories/{}", story_id), Some(&bo_token), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.json()["code"], "NOT_FOUND");

        let reply = send(
            &test,
            "PUT",
            &format!("/api/stories/{}", story_id),
            Some(&test.token),
            Some(json!({ "title": "Renamed", "published": true })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["data"]["title"], "Renamed");
        assert_eq!(reply.json()["data"]["published"], true);

        let reply = send(&test, "DELETE", &format!("/api/stories/{}", story_id), Some(&bo_token), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = send(&test, "DELETE", &format!("/api/stories/{}", story_id), Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::OK);

        let reply = send(&test, "GET", "/api/stories", Some(&test.token), None).await;
        assert_eq!(reply.json()["data"], json!([]));
    }

    #[tokio::test]
    async fn malformed_ids_read_as_not_found() {
        let test = app_with_session().await;
        let reply = send(&test, "GET", "/api/stories/not-a-uuid", Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_bodies_report_first_rule() {
        let test = app_with_session().await;
        let story_id = create_story(&test, "Graph").await;
        let reply = send(
            &test,
            "POST",
            &format!("/api/stories/{}/nodes", story_id),
            Some(&test.token),
            Some(json!({ "title": "" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["code"], "VALIDATION_ERROR");
        assert_eq!(reply.json()["error"], "Title must be 1-200 characters");
    }

    #[tokio::test]
    async fn graph_editing_and_public_structure() {
        let test = app_with_session().await;
        let story_id = create_story(&test, "Branches").await;
        let start = create_node(&test, &story_id, "Fork", true).await;
        let left = create_node(&test, &story_id, "Left", false).await;

        let choice_body = json!({ "fromNodeId": start, "toNodeId": left, "text": "Go left" });
        let reply = send(
            &test,
            "POST",
            &format!("/api/stories/{}/choices", story_id),
            Some(&test.token),
            Some(choice_body.clone()),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        let data = reply.json()["data"].clone();
        assert_eq!(data["fromNode"]["title"], "Fork");
        assert_eq!(data["toNode"]["title"], "Left");
        let choice_id = data["id"].as_str().unwrap().to_string();

        let reply = send(
            &test,
            "POST",
            &format!("/api/stories/{}/choices", story_id),
            Some(&test.token),
            Some(choice_body),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["error"], "This connection already exists");

        // Readers record choices without a session.
        let reply = send(
            &test,
            "POST",
            &format!("/api/stories/{}/choices/{}", story_id, choice_id),
            None,
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);

        let structure_uri = format!("/api/stories/{}/structure", story_id);
        let reply = send(&test, "GET", &structure_uri, None, None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        send(
            &test,
            "PUT",
            &format!("/api/stories/{}", story_id),
            Some(&test.token),
            Some(json!({ "published": true })),
        )
        .await;

        let reply = send(&test, "GET", &structure_uri, None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let data = reply.json()["data"].clone();
        assert_eq!(data["stats"]["totalNodes"], 2);
        assert_eq!(data["stats"]["totalChoices"], 1);
        assert_eq!(data["choices"][0]["timesChosen"], 1);
    }

    #[tokio::test]
    async fn retargeting_a_choice_cannot_duplicate_an_edge() {
        let test = app_with_session().await;
        let story_id = create_story(&test, "Crossroads").await;
        let a = create_node(&test, &story_id, "A", true).await;
        let b = create_node(&test, &story_id, "B", false).await;
        let c = create_node(&test, &story_id, "C", false).await;
        let choices_uri = format!("/api/stories/{}/choices", story_id);

        for (to, text) in [(&b, "To B"), (&c, "To C")] {
            let reply = send(
                &test,
                "POST",
                &choices_uri,
                Some(&test.token),
                Some(json!({ "fromNodeId": a, "toNodeId": to, "text": text })),
            )
            .await;
            assert_eq!(reply.status, StatusCode::OK);
        }
        let nodes_uri = format!("/api/stories/{}/nodes", story_id);
        let nodes = send(&test, "GET", &nodes_uri, Some(&test.token), None).await.json();
        let to_c = nodes["data"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|node| node["choices"].as_array().unwrap().clone())
            .find(|choice| choice["toNodeId"] == c.as_str())
            .unwrap();
        let to_c_id = to_c["id"].as_str().unwrap();

        let reply = send(
            &test,
            "PUT",
            &format!("{}/{}", choices_uri, to_c_id),
            Some(&test.token),
            Some(json!({ "toNodeId": b })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["error"], "This connection already exists");

        let nodes = send(&test, "GET", &nodes_uri, Some(&test.token), None).await.json();
        let mut targets: Vec<String> = nodes["data"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|node| node["choices"].as_array().unwrap().clone())
            .map(|choice| choice["toNodeId"].as_str().unwrap().to_string())
            .collect();
        targets.sort();
        let mut expected = vec![b.clone(), c.clone()];
        expected.sort();
        assert_eq!(targets, expected);
    }

    #[tokio::test]
    async fn convert_refuses_stories_that_already_have_nodes() {
        let test = app_with_session().await;
        let story_id = create_story(&test, "Linear").await;
        let uri = format!("/api/stories/{}/convert", story_id);

        let reply = send(&test, "POST", &uri, Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["data"]["isStart"], true);
        assert_eq!(reply.json()["data"]["title"], "Linear");

        let reply = send(&test, "POST", &uri, Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["error"], "Story is already interactive");
    }

    #[tokio::test]
    async fn library_lists_published_stories_with_authors() {
        let test = app_with_session().await;
        let published = create_story(&test, "Public").await;
        create_story(&test, "Private").await;
        send(
            &test,
            "PUT",
            &format!("/api/stories/{}", published),
            Some(&test.token),
            Some(json!({ "published": true })),
        )
        .await;

        let reply = send(&test, "GET", "/api/library?type=linear&limit=5", None, None).await;
        assert_eq!(reply.status, StatusCode::OK);
        let data = reply.json()["data"].clone();
        assert_eq!(data["stories"].as_array().unwrap().len(), 1);
        assert_eq!(data["stories"][0]["title"], "Public");
        assert_eq!(data["stories"][0]["authorName"], "Ada");
        assert_eq!(
            data["pagination"],
            json!({ "page": 1, "limit": 5, "total": 1, "totalPages": 1 })
        );
    }

    #[tokio::test]
    async fn characters_link_and_go_live() {
        let test = app_with_session().await;
        let story_id = create_story(&test, "Haunted").await;

        let reply = send(
            &test,
            "POST",
            "/api/characters",
            Some(&test.token),
            Some(json!({
                "name": "Mira",
                "triggerWords": ["ghost"],
                "interventionEnabled": true,
                "storyIds": [story_id, "not-a-uuid"]
            })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);

        let reply = send(
            &test,
            "GET",
            &format!("/api/story/{}/live-characters", story_id),
            Some(&test.token),
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["data"][0]["name"], "Mira");
    }

    #[tokio::test]
    async fn chat_returns_the_run_reply() {
        let mut ai = MockAi::default();
        ai.assistant
            .expect_add_user_message()
            .withf(|thread, content| thread == "thread-1" && content == "Hello")
            .times(1)
            .returning(|_, _| Ok(()));
        ai.assistant.expect_start_run().times(1).returning(|_| {
            Ok(AssistantRun {
                id: "run-1".to_string(),
                status: RunStatus::Completed,
            })
        });
        ai.assistant.expect_list_messages().returning(|_| {
            Ok(vec![ThreadMessage {
                id: "msg-1".to_string(),
                role: MessageRole::Assistant,
                run_id: Some("run-1".to_string()),
                text_segments: vec!["Hi".to_string(), "there".to_string()],
            }])
        });
        let test = app_with_ai(ai).await;

        let reply = send(
            &test,
            "POST",
            "/api/assistant/chat",
            Some(&test.token),
            Some(json!({ "threadId": "thread-1", "message": "Hello" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["data"]["reply"], "Hi\nthere");
    }

    #[tokio::test]
    async fn tts_returns_mpeg_bytes() {
        let mut ai = MockAi::default();
        ai.speech
            .expect_synthesize()
            .withf(|input| input.voice == Voice::Nova && input.speed == 4.0)
            .times(1)
            .returning(|_| Ok(vec![0xFF, 0xFB]));
        let test = app_with_ai(ai).await;

        let reply = send(
            &test,
            "POST",
            "/api/assistant/tts",
            Some(&test.token),
            Some(json!({ "text": "Read me", "voice": "nova", "speed": 10 })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.content_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(reply.bytes, vec![0xFF, 0xFB]);
    }

    #[tokio::test]
    async fn tts_rejects_unknown_voices() {
        let test = app_with_session().await;
        let reply = send(
            &test,
            "POST",
            "/api/assistant/tts",
            Some(&test.token),
            Some(json!({ "text": "Read me", "voice": "robot" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn style_generation_needs_a_profile() {
        let test = app_with_session().await;
        let reply = send(
            &test,
            "POST",
            "/api/style/generate",
            Some(&test.token),
            Some(json!({ "prompt": "A storm at sea" })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["code"], "INSUFFICIENT_DATA");

        let reply = send(&test, "GET", "/api/style/profile", Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = send(&test, "GET", "/api/style/analyze", Some(&test.token), None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.json()["data"]["eligible"], false);
    }

    fn multipart_request(token: &str, content_type: &str, bytes: &[u8]) -> HttpRequest<Body> {
        let boundary = "inkworld-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"cover.png\"\r\n\
                 Content-Type: {ct}\r\n\r\n",
                b = boundary,
                ct = content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        HttpRequest::builder()
            .method("POST")
            .uri("/api/upload")
            .header("Authorization", format!("Bearer {}", token))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn uploads_images_by_content_hash() {
        let test = app_with_session().await;
        let response = routes()
            .with_state(test.app.clone())
            .oneshot(multipart_request(&test.token, "image/png", b"png-bytes"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        let url = json["data"]["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let test = app_with_session().await;
        let response = routes()
            .with_state(test.app.clone())
            .oneshot(multipart_request(&test.token, "text/plain", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
