// End-to-end run of the sample page against a local availability endpoint

use booking_form::{
    FormError, FormEvent, PageConfig, PanelTone, SharedController, SubmitState, Target,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn availability_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rooms/12/check-availability/"))
        .and(query_param("check_in", "2025-06-02"))
        .and(query_param("check_out", "2025-06-05"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "available": true,
            "message": "Available"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rooms/12/check-availability/"))
        .and(query_param("check_in", "2025-06-10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "available": false,
            "message": "Not available for selected dates"
        })))
        .mount(&server)
        .await;

    server
}

fn sample_page(server: &MockServer) -> anyhow::Result<PageConfig> {
    let mut config = PageConfig::load("samples/booking_page.json")?;
    config.availability_url = format!("{}/rooms/12/check-availability/", server.uri());
    config.today = Some("2025-06-01".parse()?);
    Ok(config)
}

#[tokio::test]
async fn test_sample_page_books_available_dates() -> anyhow::Result<()> {
    let server = availability_server().await;
    let shared = SharedController::from_config(sample_page(&server)?)?;

    shared.dispatch(FormEvent::change(Target::Room, "12")).await;
    shared.dispatch(FormEvent::change(Target::CheckIn, "2025-06-02")).await;
    shared.dispatch(FormEvent::change(Target::CheckOut, "2025-06-05")).await;

    let form = shared.snapshot();
    assert_eq!(form.total_price, "447.00");
    assert_eq!(form.submit, SubmitState::Available);
    assert_eq!(form.panel.tone(), PanelTone::Affirmative);

    let submission = shared.with(|ctrl| ctrl.submit())?;
    assert_eq!(submission.room_id, "12");
    assert_eq!(submission.nights, 3);
    assert_eq!(submission.total_price, Decimal::from_str("447.00")?);

    // Typing a booked check-out withdraws the confirmation
    let effects = shared.dispatch(FormEvent::input(Target::CheckOut, "2025-06-15")).await;
    assert_eq!(effects.len(), 1);

    let form = shared.snapshot();
    assert_eq!(form.check_out.value_str(), "");
    assert_eq!(form.submit, SubmitState::Unknown);
    assert!(!form.panel.is_visible());
    assert_eq!(shared.with(|ctrl| ctrl.submit()), Err(FormError::SubmitDisabled));
    Ok(())
}

#[tokio::test]
async fn test_sample_page_rejects_taken_and_booked_dates() -> anyhow::Result<()> {
    let server = availability_server().await;
    let shared = SharedController::from_config(sample_page(&server)?)?;

    // 2025-06-14 is listed as booked in the sample page
    let effects = shared.dispatch(FormEvent::input(Target::CheckIn, "2025-06-14")).await;
    assert_eq!(effects.len(), 1);
    assert_eq!(shared.snapshot().check_in.value_str(), "");
    assert_eq!(shared.snapshot().submit, SubmitState::Unknown);

    shared.dispatch(FormEvent::change(Target::CheckIn, "2025-06-10")).await;
    shared.dispatch(FormEvent::change(Target::CheckOut, "2025-06-12")).await;

    let form = shared.snapshot();
    assert!(form.submit.is_disabled());
    assert_eq!(form.panel.tone(), PanelTone::Negative);
    assert_eq!(form.panel.text(), "Not available for selected dates");
    Ok(())
}
