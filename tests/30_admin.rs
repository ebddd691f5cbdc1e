mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

/// Admin lifecycle scenario, run as one sequential flow so the bootstrap
/// window and claim refreshes happen in a defined order.
#[tokio::test]
async fn admin_bootstrap_and_account_lifecycle() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    // A plain user cannot reach the lifecycle surface
    let user_token = common::login(base, "lifecycle-user@example.com", "user-pw").await?;
    let res = client
        .get(format!("{}/api/admin/users", base))
        .bearer_auth(&user_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // ...nor elevate anyone, including themselves
    let res = client
        .post(format!("{}/api/auth/admin-claims", base))
        .bearer_auth(&user_token)
        .json(&json!({ "email": "lifecycle-user@example.com", "isAdmin": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The configured bootstrap email may self-provision the first admin
    let boot_token = common::login(base, common::BOOTSTRAP_EMAIL, "boot-pw").await?;
    let res = client
        .post(format!("{}/api/auth/admin-claims", base))
        .bearer_auth(&boot_token)
        .json(&json!({ "email": common::BOOTSTRAP_EMAIL, "isAdmin": true }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Claim reaches the gate only through a refreshed token
    let res = client
        .post(format!("{}/api/auth/refresh", base))
        .bearer_auth(&boot_token)
        .send()
        .await?;
    let admin_token: String =
        res.json::<serde_json::Value>().await?["data"]["token"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/auth/whoami", base))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["data"]["admin"], true);
    assert_eq!(body["data"]["gcpAccess"], true);

    // Listing includes both accounts created above
    let res = client
        .get(format!("{}/api/admin/users", base))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    let users = body["users"].as_array().unwrap().clone();
    let target_uid = users
        .iter()
        .find(|u| u["email"] == "lifecycle-user@example.com")
        .and_then(|u| u["uid"].as_str())
        .unwrap()
        .to_string();
    assert!(users.iter().any(|u| u["email"] == common::BOOTSTRAP_EMAIL));

    // Disable: login refused; enable: login works again
    let res = client
        .post(format!("{}/api/admin/users/{}/disable", base, target_uid))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "email": "lifecycle-user@example.com", "password": "user-pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(format!("{}/api/admin/users/{}/enable", base, target_uid))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    common::login(base, "lifecycle-user@example.com", "user-pw").await?;

    // Reset credential: returned once, old password stops working
    let res = client
        .post(format!("{}/api/admin/users/{}/reset-password", base, target_uid))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    let new_password = body["data"]["password"].as_str().unwrap().to_string();
    assert!(new_password.len() >= 8);

    let res = client
        .post(format!("{}/auth/login", base))
        .json(&json!({ "email": "lifecycle-user@example.com", "password": "user-pw" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    common::login(base, "lifecycle-user@example.com", &new_password).await?;

    // Reset with a missing uid is an invalid argument
    let res = client
        .post(format!("{}/api/admin/users/%20/reset-password", base))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Delete is terminal: the uid disappears from the listing
    let res = client
        .delete(format!("{}/api/admin/users/{}", base, target_uid))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/admin/users", base))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    let body: serde_json::Value = res.json().await?;
    assert!(!body["users"].as_array().unwrap().iter().any(|u| u["uid"] == target_uid.as_str()));

    // Deleting the same uid again reports not found
    let res = client
        .delete(format!("{}/api/admin/users/{}", base, target_uid))
        .bearer_auth(&admin_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    Ok(())
}
