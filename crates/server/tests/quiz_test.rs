//! Integration tests for quiz generation.

mod common;

use anyhow::Result;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn test_quiz_generation_happy_path() -> Result<()> {
    let app = TestApp::spawn(None).await?;
    let (_user_id, token) = app.register_user("student@example.com", "password123").await?;

    app.mock_ai_reply(
        "QUESTION 1: What is supervised learning?\n\
         ANSWER 1: Learning from labeled examples.\n\n\
         QUESTION 2: What is a neural network?\n\
         ANSWER 2: A model inspired by the brain.\n\n\
         QUESTION 3: What is overfitting?\n\
         ANSWER 3: Memorizing training data instead of generalizing.",
    );

    let response = app
        .client
        .post(format!("{}/api/chat/quiz", app.address))
        .bearer_auth(&token)
        .json(&json!({ "numQuestions": 3, "difficulty": "easy" }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;

    let quiz = &body["data"]["quiz"];
    assert_eq!(quiz["questions"].as_array().unwrap().len(), 3);
    assert_eq!(quiz["difficulty"], json!("easy"));
    assert_eq!(quiz["degraded"], json!(false));
    assert_eq!(
        quiz["questions"][0]["question"],
        json!("What is supervised learning?")
    );
    assert_eq!(
        quiz["questions"][2]["answer"],
        json!("Memorizing training data instead of generalizing.")
    );
    let settings = &body["data"]["settings"];
    assert_eq!(settings["numQuestions"], json!(3));
    assert_eq!(settings["difficulty"], json!("easy"));
    assert!(settings["subject"].is_string());
    assert_eq!(body["data"]["fileId"], Value::Null);

    Ok(())
}

#[tokio::test]
async fn test_quiz_uses_uploaded_file_content() -> Result<()> {
    let app = TestApp::spawn(None).await?;
    let (_user_id, token) = app.register_user("student@example.com", "password123").await?;

    let pdf_bytes = common::pdf_helper::generate_test_pdf(
        "Photosynthesis converts sunlight into chemical energy in chloroplasts.",
    )?;
    let part = reqwest::multipart::Part::bytes(pdf_bytes)
        .file_name("bio-notes.pdf")
        .mime_str("application/pdf")?;
    let form = reqwest::multipart::Form::new().part("file", part);
    let response = app
        .client
        .post(format!("{}/api/upload", app.address))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let uploaded: Value = response.json().await?;
    let file_id = uploaded["data"]["document"]["id"].as_str().unwrap().to_string();

    // Only matches when the prompt carries the document text, so a dropped
    // fileId would leave this mock unhit and fail the request.
    let ai_mock = app.mock_server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/v1/chat/completions")
            .body_contains("Photosynthesis");
        then.status(200).json_body(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "QUESTION 1: What do chloroplasts do?\nANSWER 1: They host photosynthesis."
                }
            }]
        }));
    });

    let response = app
        .client
        .post(format!("{}/api/chat/quiz", app.address))
        .bearer_auth(&token)
        .json(&json!({ "fileId": file_id, "numQuestions": 1, "difficulty": "easy" }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;
    ai_mock.assert();
    assert_eq!(body["data"]["fileId"], json!(file_id));
    assert_eq!(body["data"]["settings"]["numQuestions"], json!(1));
    assert_eq!(body["data"]["quiz"]["degraded"], json!(false));

    Ok(())
}

#[tokio::test]
async fn test_quiz_pads_short_replies_and_flags_degraded() -> Result<()> {
    let app = TestApp::spawn(None).await?;
    let (_user_id, token) = app.register_user("student@example.com", "password123").await?;

    // The model only produces two pairs for a five-question request.
    app.mock_ai_reply(
        "QUESTION 1: What is gradient descent?\n\
         ANSWER 1: An iterative optimization method.\n\n\
         QUESTION 2: What is a loss function?\n\
         ANSWER 2: A measure of prediction error.",
    );

    let response = app
        .client
        .post(format!("{}/api/chat/quiz", app.address))
        .bearer_auth(&token)
        .json(&json!({ "numQuestions": 5 }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await?;

    let quiz = &body["data"]["quiz"];
    assert_eq!(quiz["questions"].as_array().unwrap().len(), 5);
    assert_eq!(quiz["degraded"], json!(true));
    // Padded entries use numbered placeholders.
    let padded = quiz["questions"][4]["question"].as_str().unwrap();
    assert!(padded.contains("(Question 5)"), "got: {padded}");

    Ok(())
}

#[tokio::test]
async fn test_quiz_validation_errors() -> Result<()> {
    let app = TestApp::spawn(None).await?;
    let (_user_id, token) = app.register_user("student@example.com", "password123").await?;

    for bad_count in [0, 11] {
        let response = app
            .client
            .post(format!("{}/api/chat/quiz", app.address))
            .bearer_auth(&token)
            .json(&json!({ "numQuestions": bad_count }))
            .send()
            .await?;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await?;
        assert_eq!(body["code"], json!("INVALID_QUESTION_COUNT"));
    }

    let response = app
        .client
        .post(format!("{}/api/chat/quiz", app.address))
        .bearer_auth(&token)
        .json(&json!({ "numQuestions": 3, "difficulty": "impossible" }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], json!("INVALID_DIFFICULTY"));

    Ok(())
}
