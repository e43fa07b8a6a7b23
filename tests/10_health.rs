mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_memory_store() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = reqwest::get(server.url("/health")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "ok");
    assert_eq!(body["backend"], "memory");
    Ok(())
}

#[tokio::test]
async fn home_page_descriptor_is_public() -> Result<()> {
    let server = common::ensure_server().await?;

    let res = common::client().get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["title"], "Home");
    assert_eq!(body["protected"], false);
    Ok(())
}
