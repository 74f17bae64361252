mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn ids(body: &Value) -> Vec<i64> {
    body["surveys"]
        .as_array()
        .map(|surveys| surveys.iter().filter_map(|s| s["_id"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let res = app.client.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");

    Ok(())
}

#[tokio::test]
async fn empty_store_lists_nothing() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let res = app.client.get(app.url("/surveys")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "surveys": [] }));

    Ok(())
}

#[tokio::test]
async fn listing_shows_only_published_surveys() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;

    let body = app.client.get(app.url("/surveys")).send().await?.json::<Value>().await?;
    assert_eq!(ids(&body), vec![seeded.ceos as i64]);
    assert!(body["surveys"][0].get("questions").is_none());

    Ok(())
}

#[tokio::test]
async fn search_matches_author_title_and_description() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;

    let cases = [
        ("sponge", vec![seeded.ceos]),
        ("albums", vec![seeded.albums]),
        ("ceos of all", vec![seeded.ceos]),
        ("HOT FIYA", vec![seeded.albums]),
        ("no such survey", vec![]),
    ];
    for (term, expected) in cases {
        let res = app
            .client
            .get(app.url("/surveys"))
            .query(&[("search", term)])
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body = res.json::<Value>().await?;
        let expected: Vec<i64> = expected.into_iter().map(i64::from).collect();
        assert_eq!(ids(&body), expected, "search {:?}", term);
    }

    Ok(())
}

#[tokio::test]
async fn blank_search_behaves_like_no_search() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;

    let body = app
        .client
        .get(app.url("/surveys?search="))
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(ids(&body), vec![seeded.ceos as i64]);

    Ok(())
}

#[tokio::test]
async fn detail_includes_questions() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;

    let res = app
        .client
        .get(app.url(&format!("/surveys/{}", seeded.albums)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let survey = &body["survey"];
    assert_eq!(survey["_id"], seeded.albums);
    assert_eq!(survey["author"], "joerocket");
    assert_eq!(survey["title"], "best albums of 2009");
    assert_eq!(survey["published"], false);
    assert_eq!(
        survey["questions"],
        json!([{
            "_id": seeded.question,
            "_survey_id": seeded.albums,
            "title": "Favorite EDM Artist",
            "question_type": "multiple"
        }])
    );

    Ok(())
}

#[tokio::test]
async fn unknown_survey_is_not_found() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    app.seed().await?;

    for path in ["/surveys/33797", "/surveys/0", "/surveys/not-a-number"] {
        let res = app.client.get(app.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", path);
        let body = res.json::<Value>().await?;
        assert!(body["error"].is_string(), "{}", body);
    }

    Ok(())
}

#[tokio::test]
async fn choices_are_listed_per_question() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;

    let res = app
        .client
        .get(app.url(&format!("/questions/{}/choices", seeded.question)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    let titles: Vec<&str> = body["choices"]
        .as_array()
        .map(|choices| choices.iter().filter_map(|c| c["title"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(titles, vec!["Skrillex", "Deadmau5"]);
    assert_eq!(body["choices"][0]["_question_id"], seeded.question);

    let res = app.client.get(app.url("/questions/999/choices")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found() -> Result<()> {
    let app = common::TestApp::spawn().await?;

    let res = app.client.get(app.url("/fakeaddress")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "Not Found" }));

    Ok(())
}

#[tokio::test]
async fn unhandled_method_on_known_path_is_not_found() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let survey_path = format!("/surveys/{}", seeded.albums);

    let responses = vec![
        ("PUT /surveys/:id", app.client.put(app.url(&survey_path)).send().await?),
        (
            "GET /surveys/:id/questions",
            app.client.get(app.url(&format!("{}/questions", survey_path))).send().await?,
        ),
        ("DELETE /surveys", app.client.delete(app.url("/surveys")).send().await?),
        ("GET /login", app.client.get(app.url("/login")).send().await?),
    ];
    for (label, res) in responses {
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", label);
        assert_eq!(res.json::<Value>().await?, json!({ "error": "Not Found" }), "{}", label);
    }

    // The survey is untouched by the unmatched requests
    let res = app.client.get(app.url(&survey_path)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    Ok(())
}
