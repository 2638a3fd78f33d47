//! HTTP API tests
//!
//! Drive the axum router in-process with `tower::ServiceExt::oneshot`:
//! - Verdict/confidence for classifier outputs around the threshold
//! - 400 for code that cannot be analyzed
//! - 500 for malformed bodies and classifier failures
//! - End-to-end prediction with a GBDT model loaded from disk

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use refactor_predictor::classifier::{
    load_classifier, ClassProbabilities, Classifier, ClassifierError, FeatureVector, ModelFormat,
};
use refactor_predictor::prediction::PredictionService;
use refactor_predictor::server::{router, AppState, BODY_NOT_OBJECT};

const SNIPPET: &str = "def greet(name):\n    return 'hi ' + name\n";

/// Classifier returning a fixed "needs refactor" probability
struct FixedClassifier(f64);

impl Classifier for FixedClassifier {
    fn predict_proba(&self, _features: &FeatureVector) -> Result<ClassProbabilities, ClassifierError> {
        ClassProbabilities::from_positive(self.0)
    }
}

struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn predict_proba(&self, _features: &FeatureVector) -> Result<ClassProbabilities, ClassifierError> {
        Err(ClassifierError::Inference("model exploded".to_string()))
    }
}

struct PanickingClassifier;

impl Classifier for PanickingClassifier {
    fn predict_proba(&self, _features: &FeatureVector) -> Result<ClassProbabilities, ClassifierError> {
        panic!("corrupt tree");
    }
}

fn app(classifier: impl Classifier + 'static) -> Router {
    let service = PredictionService::with_classifier(Arc::new(classifier));
    router(AppState::new(service))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, body.to_vec())
}

async fn post_predict(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    let (status, bytes) = send(app, request).await;
    let value = serde_json::from_slice(&bytes).expect("response should be JSON");
    (status, value)
}

async fn predict_code(app: Router, code: &str) -> (StatusCode, Value) {
    post_predict(app, &json!({ "code": code }).to_string()).await
}

#[tokio::test]
async fn test_landing_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, body) = send(app(FixedClassifier(0.5)), request).await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("/api/predict"));
}

#[tokio::test]
async fn test_confident_refactor() {
    let (status, body) = predict_code(app(FixedClassifier(0.85)), SNIPPET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"needs_refactor": 1, "confidence": "85.00"}));
}

#[tokio::test]
async fn test_threshold_is_inclusive() {
    let (status, body) = predict_code(app(FixedClassifier(0.30)), SNIPPET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["needs_refactor"], json!(1));
    assert_eq!(body["confidence"], json!("30.00"));
}

#[tokio::test]
async fn test_below_threshold_reports_complement() {
    let (status, body) = predict_code(app(FixedClassifier(0.29)), SNIPPET).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"needs_refactor": 0, "confidence": "71.00"}));
}

#[tokio::test]
async fn test_unanalyzable_code_is_a_client_error() {
    let expected = json!({"error": "Could not analyze code."});

    for code in ["", "   \n\t", "def broken(:\n    pass\n", "class (\n"] {
        let (status, body) = predict_code(app(FixedClassifier(0.9)), code).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "code: {code:?}");
        assert_eq!(body, expected, "code: {code:?}");
    }
}

#[tokio::test]
async fn test_missing_or_non_string_code_is_a_client_error() {
    for body in [r#"{}"#, r#"{"code": null}"#, r#"{"code": 42}"#, r#"{"source": "x = 1"}"#] {
        let (status, value) = post_predict(app(FixedClassifier(0.9)), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(value["error"], json!("Could not analyze code."));
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_server_error() {
    let (status, value) = post_predict(app(FixedClassifier(0.9)), "{not json").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(value["error"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, _) = post_predict(app(FixedClassifier(0.9)), "[1, 2, 3]").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_non_object_body_is_a_server_error() {
    let expected = json!({ "error": BODY_NOT_OBJECT });

    for body in [r#"["x = 1"]"#, "[]", r#""x = 1""#, "42", "null"] {
        let (status, value) = post_predict(app(FixedClassifier(0.9)), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body: {body}");
        assert_eq!(value, expected, "body: {body}");
    }
}

#[tokio::test]
async fn test_python2_source_is_a_client_error() {
    for code in ["print \"hello\"\n", "exec \"x = 1\"\n"] {
        let (status, body) = predict_code(app(FixedClassifier(0.9)), code).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "code: {code:?}");
        assert_eq!(body, json!({"error": "Could not analyze code."}));
    }
}

#[tokio::test]
async fn test_deeply_nested_source_is_a_client_error() {
    let depth = 100_000;
    let code = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));

    let router = app(FixedClassifier(0.9));
    let (status, body) = predict_code(router.clone(), &code).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Could not analyze code."}));

    // The server is still answering
    let (status, _) = predict_code(router, SNIPPET).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_content_type_is_a_server_error() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .body(Body::from(json!({ "code": SNIPPET }).to_string()))
        .unwrap();
    let (status, bytes) = send(app(FixedClassifier(0.9)), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn test_classifier_failure_carries_message() {
    let (status, body) = predict_code(app(FailingClassifier), SNIPPET).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "inference failed: model exploded"}));
}

#[tokio::test]
async fn test_classifier_panic_does_not_take_down_the_server() {
    let router = app(PanickingClassifier);

    let (status, body) = predict_code(router.clone(), SNIPPET).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    // Analysis failures are still answered normally afterwards
    let (status, _) = predict_code(router, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_requires_post() {
    let request = Request::builder()
        .uri("/api/predict")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(FixedClassifier(0.5)), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

/// Train a small GBDT model where long, branchy code needs refactoring
fn write_trained_model(path: &std::path::Path) {
    use gbdt::config::Config;
    use gbdt::decision_tree::Data;
    use gbdt::gradient_boost::GBDT;

    let mut cfg = Config::new();
    cfg.set_feature_size(5);
    cfg.set_max_depth(3);
    cfg.set_iterations(20);
    cfg.set_shrinkage(0.3);
    cfg.set_loss("LogLikelyhood");
    cfg.set_debug(false);
    cfg.set_training_optimization_level(2);
    cfg.set_min_leaf_size(1);

    let mut data = Vec::new();
    for i in 0..20u16 {
        let i = f32::from(i);
        // lloc, comments, avg_cc, max_cc, function_count
        data.push(Data::new_training_data(
            vec![3.0 + i, i % 3.0, 1.0, 1.0 + (i % 2.0), 1.0 + (i % 3.0)],
            1.0,
            -1.0,
            None,
        ));
        data.push(Data::new_training_data(
            vec![40.0 + 2.0 * i, i % 3.0, 9.0 + i, 20.0 + i, 1.0 + (i % 6.0)],
            1.0,
            1.0,
            None,
        ));
    }

    let mut model = GBDT::new(&cfg);
    model.fit(&mut data);
    model
        .save_model(path.to_str().expect("utf-8 path"))
        .expect("save model");
}

fn branchy_function(branches: usize) -> String {
    let mut code = String::from("def dispatch(op, x):\n");
    for i in 0..branches {
        let kw = if i == 0 { "if" } else { "elif" };
        code.push_str(&format!("    {kw} op == {i} and x > {i}:\n        x = x * {i} + 1\n"));
    }
    code.push_str("    return x\n");
    code
}

#[tokio::test]
async fn test_end_to_end_with_gbdt_model() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    write_trained_model(&model_path);

    let classifier = load_classifier(&model_path, ModelFormat::Gbdt).expect("load model");
    let router = app(classifier);

    let (status, simple) = predict_code(router.clone(), SNIPPET).await;
    assert_eq!(status, StatusCode::OK);
    // lloc 82, complexity 81: beyond every positive training sample
    let (status, complex) = predict_code(router, &branchy_function(40)).await;
    assert_eq!(status, StatusCode::OK);

    for body in [&simple, &complex] {
        let confidence: f64 = body["confidence"]
            .as_str()
            .and_then(|c| c.parse().ok())
            .expect("confidence is a numeric string");
        assert!((0.0..=100.0).contains(&confidence));
        assert!(body["needs_refactor"] == json!(0) || body["needs_refactor"] == json!(1));
    }
    assert_eq!(complex["needs_refactor"], json!(1));
}
