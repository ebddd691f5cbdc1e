mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn upload_file(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    name: &str,
    body: &'static str,
) -> Result<()> {
    let res = client
        .put(format!("{}/api/files/{}", base_url, name))
        .bearer_auth(token)
        .header("content-type", "text/plain")
        .body(body)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "upload failed: {}", res.status());
    Ok(())
}

async fn hot_file_urls(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Result<serde_json::Value> {
    let res = client
        .get(format!("{}/api/files", base_url))
        .bearer_auth(token)
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "list failed: {}", res.status());
    let body: serde_json::Value = res.json().await?;
    Ok(body["data"]["files"].clone())
}

/// Full archive/retrieve scenario driven through the HTTP surface: upload,
/// tier-access gating, grant + refresh, archive, duplicate archive, retrieve.
#[tokio::test]
async fn archive_and_retrieve_flow() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    let token = common::login(base, "archiver@example.com", "pw-1234").await?;
    upload_file(&client, base, &token, "report.txt", "hello archive").await?;

    let files = hot_file_urls(&client, base, &token).await?;
    assert_eq!(files[0]["name"], "report.txt");
    let file_url = files[0]["url"].as_str().unwrap().to_string();

    // The public download URL serves the bytes the engine will fetch
    let res = client.get(&file_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "hello archive");

    // Tier operations are gated until access is granted
    let res = client
        .post(format!("{}/api/archive/upload", base))
        .bearer_auth(&token)
        .json(&json!({ "fileName": "report.txt", "fileUrl": file_url }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Self-grant, then refresh to pick up the claim; the old token still
    // lacks it
    let res = client
        .post(format!("{}/api/auth/grant-access", base))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/archive/files", base))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN, "stale token must not carry the new claim");

    let res = client
        .post(format!("{}/api/auth/refresh", base))
        .bearer_auth(&token)
        .send()
        .await?;
    let token: String =
        res.json::<serde_json::Value>().await?["data"]["token"].as_str().unwrap().to_string();

    // Archive: hot copy gone, cold listing has it
    let res = client
        .post(format!("{}/api/archive/upload", base))
        .bearer_auth(&token)
        .json(&json!({ "fileName": "report.txt", "fileUrl": file_url }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let files = hot_file_urls(&client, base, &token).await?;
    assert_eq!(files.as_array().unwrap().len(), 0);

    let res = client
        .get(format!("{}/api/archive/files", base))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["data"]["files"][0]["name"], "report.txt");

    // Re-archiving the same file now fails upstream: the hot source is gone
    let res = client
        .post(format!("{}/api/archive/upload", base))
        .bearer_auth(&token)
        .json(&json!({ "fileName": "report.txt", "fileUrl": file_url }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

    // Retrieve: back in the hot tier, archive empty again
    let res = client
        .post(format!("{}/api/archive/download", base))
        .bearer_auth(&token)
        .json(&json!({ "fileName": "report.txt" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let files = hot_file_urls(&client, base, &token).await?;
    assert_eq!(files[0]["name"], "report.txt");

    let res = client
        .get(format!("{}/api/archive/files", base))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["data"]["files"].as_array().unwrap().len(), 0);

    // Retrieving it again reports not found
    let res = client
        .post(format!("{}/api/archive/download", base))
        .bearer_auth(&token)
        .json(&json!({ "fileName": "report.txt" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn batch_retrieve_reports_per_item_outcomes() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    let token = common::login(base, "batcher@example.com", "pw-1234").await?;
    client
        .post(format!("{}/api/auth/grant-access", base))
        .bearer_auth(&token)
        .send()
        .await?;
    let res = client
        .post(format!("{}/api/auth/refresh", base))
        .bearer_auth(&token)
        .send()
        .await?;
    let token: String =
        res.json::<serde_json::Value>().await?["data"]["token"].as_str().unwrap().to_string();

    for name in ["a.txt", "b.txt"] {
        upload_file(&client, base, &token, name, "payload").await?;
        let files = hot_file_urls(&client, base, &token).await?;
        let url = files
            .as_array()
            .unwrap()
            .iter()
            .find(|f| f["name"] == name)
            .and_then(|f| f["url"].as_str())
            .unwrap()
            .to_string();
        let res = client
            .post(format!("{}/api/archive/upload", base))
            .bearer_auth(&token)
            .json(&json!({ "fileName": name, "fileUrl": url }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .post(format!("{}/api/archive/download/batch", base))
        .bearer_auth(&token)
        .json(&json!({ "fileNames": ["a.txt", "missing.txt", "b.txt"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;

    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["succeeded"], json!(["a.txt", "b.txt"]));
    assert_eq!(body["data"]["failed"][0]["name"], "missing.txt");

    // Both successful items made it back despite the failure between them
    let files = hot_file_urls(&client, base, &token).await?;
    let names: Vec<&str> =
        files.as_array().unwrap().iter().filter_map(|f| f["name"].as_str()).collect();
    assert!(names.contains(&"a.txt") && names.contains(&"b.txt"));

    Ok(())
}
