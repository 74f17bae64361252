mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn fetch_survey(app: &common::TestApp, id: i32) -> Result<Value> {
    let body = app
        .client
        .get(app.url(&format!("/surveys/{}", id)))
        .send()
        .await?
        .json::<Value>()
        .await?;
    Ok(body["survey"].clone())
}

#[tokio::test]
async fn create_assigns_author_and_defaults() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let token = app.token_for("kevin")?;

    let res = app
        .client
        .post(app.url("/surveys"))
        .json(&json!({
            "_token": token,
            "title": "test survey",
            "description": "test description",
            "category": "test category",
            "author": "someone else"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created = res.json::<Value>().await?["survey"].clone();
    assert_eq!(created["author"], "kevin");
    assert_eq!(created["published"], false);
    assert_eq!(created["anonymous"], true);
    assert!(created["date_posted"].is_string());

    let id = created["_id"].as_i64().expect("numeric _id") as i32;
    let fetched = fetch_survey(&app, id).await?;
    assert_eq!(fetched["title"], "test survey");
    assert_eq!(fetched["description"], "test description");
    assert_eq!(fetched["category"], "test category");
    assert_eq!(fetched["questions"], json!([]));

    // Unpublished surveys stay out of the plain listing
    let listed = app.client.get(app.url("/surveys")).send().await?.json::<Value>().await?;
    assert_eq!(listed, json!({ "surveys": [] }));

    Ok(())
}

#[tokio::test]
async fn create_requires_title() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let token = app.token_for("kevin")?;

    let res = app
        .client
        .post(app.url("/surveys"))
        .json(&json!({ "_token": token, "description": "no title here" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>().await?;
    assert!(body["error"].is_string(), "{}", body);

    Ok(())
}

#[tokio::test]
async fn bad_or_missing_token_is_unauthorized() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let survey_url = app.url(&format!("/surveys/{}", seeded.albums));

    let responses = vec![
        app.client
            .post(app.url("/surveys"))
            .json(&json!({ "title": "no token" }))
            .send()
            .await?,
        app.client
            .post(app.url("/surveys"))
            .json(&json!({ "_token": "3s8sd3", "title": "bad token" }))
            .send()
            .await?,
        app.client
            .patch(&survey_url)
            .json(&json!({ "_token": "3s8sd3", "title": "bad token" }))
            .send()
            .await?,
        app.client.delete(&survey_url).send().await?,
    ];
    for res in responses {
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.json::<Value>().await?, json!({ "error": "Unauthorized" }));
    }

    assert_eq!(fetch_survey(&app, seeded.albums).await?["title"], "best albums of 2009");

    Ok(())
}

#[tokio::test]
async fn token_is_accepted_from_query_and_header() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let token = app.token_for("kevin")?;

    let res = app
        .client
        .post(app.url("/surveys"))
        .query(&[("_token", token.as_str())])
        .json(&json!({ "title": "via query" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .client
        .post(app.url("/surveys"))
        .bearer_auth(&token)
        .json(&json!({ "title": "via header" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["survey"]["author"], "kevin");
    assert!(body["survey"].get("_token").is_none());

    Ok(())
}

#[tokio::test]
async fn author_can_patch_title_and_description() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let token = app.token_for("joerocket")?;

    let res = app
        .client
        .patch(app.url(&format!("/surveys/{}", seeded.albums)))
        .json(&json!({
            "_token": token,
            "title": "__bettertitle__",
            "description": "__muchbetter__",
            "notdescription": "dropped"
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated = res.json::<Value>().await?["survey"].clone();
    assert_eq!(updated["title"], "__bettertitle__");
    assert_eq!(updated["description"], "__muchbetter__");
    assert_eq!(updated["author"], "joerocket");
    assert!(updated.get("notdescription").is_none());

    let fetched = fetch_survey(&app, seeded.albums).await?;
    assert_eq!(fetched["title"], "__bettertitle__");
    assert_eq!(fetched["category"], "music");

    Ok(())
}

#[tokio::test]
async fn publishing_makes_a_survey_listed() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let token = app.token_for("joerocket")?;

    let res = app
        .client
        .patch(app.url(&format!("/surveys/{}", seeded.albums)))
        .json(&json!({ "_token": token, "published": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let listed = app.client.get(app.url("/surveys")).send().await?.json::<Value>().await?;
    let mut ids: Vec<i64> = listed["surveys"]
        .as_array()
        .map(|surveys| surveys.iter().filter_map(|s| s["_id"].as_i64()).collect())
        .unwrap_or_default();
    ids.sort_unstable();
    assert_eq!(ids, vec![seeded.albums as i64, seeded.ceos as i64]);

    Ok(())
}

#[tokio::test]
async fn patch_rejects_server_controlled_or_unknown_fields() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let token = app.token_for("joerocket")?;
    let url = app.url(&format!("/surveys/{}", seeded.albums));

    let payloads = [
        json!({ "_token": token, "author": "hackerman", "notdescription": "__muchbetter__", "title": "__bettertitle__" }),
        json!({ "_token": token, "date_posted": "2020-01-01T00:00:00Z" }),
        json!({ "_token": token, "notdescription": "__muchbetter__" }),
        json!({ "_token": token }),
        json!({ "_token": token, "published": "yes" }),
    ];
    for payload in payloads {
        let res = app.client.patch(&url).json(&payload).send().await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{}", payload);
        let body = res.json::<Value>().await?;
        assert!(body["error"].is_string(), "{}", body);
    }

    let fetched = fetch_survey(&app, seeded.albums).await?;
    assert_eq!(fetched["title"], "best albums of 2009");
    assert_eq!(fetched["author"], "joerocket");
    assert_eq!(fetched["published"], false);

    Ok(())
}

#[tokio::test]
async fn non_author_cannot_patch() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let token = app.token_for("spongebob")?;

    let res = app
        .client
        .patch(app.url(&format!("/surveys/{}", seeded.albums)))
        .json(&json!({ "_token": token, "title": "mine now" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "Unauthorized" }));

    assert_eq!(fetch_survey(&app, seeded.albums).await?["title"], "best albums of 2009");

    Ok(())
}

#[tokio::test]
async fn missing_survey_is_not_found_before_ownership() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    app.seed().await?;
    let token = app.token_for("kevin")?;

    let res = app
        .client
        .patch(app.url("/surveys/33797"))
        .json(&json!({ "_token": token, "title": "anything" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .client
        .delete(app.url("/surveys/33797"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn author_can_delete() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let token = app.token_for("joerocket")?;
    let url = app.url(&format!("/surveys/{}", seeded.albums));

    let res = app
        .client
        .delete(&url)
        .json(&json!({ "_token": token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!("Deleted"));

    let res = app.client.get(&url).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .client
        .get(app.url(&format!("/questions/{}/choices", seeded.question)))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn non_author_cannot_delete() -> Result<()> {
    let app = common::TestApp::spawn().await?;
    let seeded = app.seed().await?;
    let token = app.token_for("joerocket")?;

    let res = app
        .client
        .delete(app.url(&format!("/surveys/{}", seeded.ceos)))
        .query(&[("_token", token.as_str())])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>().await?, json!({ "error": "Unauthorized" }));

    assert_eq!(fetch_survey(&app, seeded.ceos).await?["author"], "spongebob");

    Ok(())
}
