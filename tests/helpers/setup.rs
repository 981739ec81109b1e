use slotbook_api::Application;
use slotbook_infra::{setup_context, Config};
use slotbook_sdk::SlotbookSDK;

pub struct TestApp {
    pub config: Config,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, SlotbookSDK, String) {
    let mut ctx = setup_context().await.expect("Failed to set up context");
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { config };
    let sdk = SlotbookSDK::new(address.clone());
    (app, sdk, address)
}
