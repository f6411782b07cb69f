use forneria_admin_api::routes::health::health_check;

#[tokio::test]
async fn health_check_returns_ok() {
    let resp = health_check().await;
    assert_eq!(resp.0.message, "Health check");
    assert!(resp.0.data.is_some());
}
