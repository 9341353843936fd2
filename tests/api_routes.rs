mod common;

use std::sync::Arc;

use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};

use relay_race_standings::app::{build_rocket, AppState};
use relay_race_standings::modules::config::RaceConfig;
use relay_race_standings::modules::events::{EventBus, StandingsBroadcaster};
use relay_race_standings::modules::repository::RaceRepository;

use common::pin_for;

const ORIGIN: &str = "http://localhost:5173";

fn client() -> Client {
    let config = RaceConfig::default();
    let repository: Arc<dyn RaceRepository> = Arc::new(common::repository(&config));
    // the broadcaster is dropped right away, streams end after the first event
    let (_, standings) = StandingsBroadcaster::new(Arc::clone(&repository), config);

    let state = AppState::new(
        repository,
        config,
        EventBus::default(),
        "admin-secret",
        standings,
        vec![ORIGIN.to_string()],
    );

    Client::tracked(build_rocket(state)).expect("valid rocket instance")
}

fn pin(runner_id: i32) -> Header<'static> {
    Header::new("X-Runner-Pin", pin_for(runner_id))
}

#[test]
fn health_is_ok() {
    let client = client();
    let response = client.get("/api/health").dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["status"], "ok");
}

#[test]
fn dashboard_lists_every_team() {
    let client = client();
    let response = client.get("/api/dashboard").dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().unwrap();
    let standings = body["standings"].as_array().unwrap();
    assert_eq!(standings.len(), 6);
    assert_eq!(standings[0]["rank"], 1);
    assert_eq!(standings[0]["completed_leg_count"], 0);
    assert_eq!(standings[0]["current_leg_number"], 1);
}

#[test]
fn submitted_time_moves_the_team_up() {
    let client = client();
    // GREY is third by name
    let response = client
        .post("/api/entry/time")
        .header(ContentType::JSON)
        .header(pin(311))
        .body(json!({ "leg_number": 1, "clock_time": "30:00", "kills": 2 }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let result: Value = response.into_json().unwrap();
    assert_eq!(result["runner_id"], 311);
    assert_eq!(result["clock_time"], 1800);

    let body: Value = client.get("/api/dashboard").dispatch().into_json().unwrap();
    let leader = &body["standings"][0];
    assert_eq!(leader["team"]["name"], "GREY");
    assert_eq!(leader["completed_leg_count"], 1);
    assert_eq!(leader["total_elapsed_time"], 1800);
    assert_eq!(leader["total_kills"], 2);
    assert_eq!(leader["current_leg_number"], 2);

    let kills: Value = client.get("/api/dashboard/kills").dispatch().into_json().unwrap();
    assert_eq!(kills[0]["team"]["name"], "GREY");

    let boards: Value = client.get("/api/dashboard/leg-results").dispatch().into_json().unwrap();
    assert_eq!(boards[0]["results"][0]["runner_id"], 311);
    assert_eq!(boards[0]["results"][0]["rank"], 1);
}

#[test]
fn missing_credentials_are_unauthorized() {
    let client = client();
    let response = client
        .post("/api/entry/time")
        .header(ContentType::JSON)
        .body(json!({ "leg_number": 1, "clock_time": 1800 }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn runners_can_not_use_the_van_entry() {
    let client = client();
    let response = client
        .post("/api/entry/van")
        .header(ContentType::JSON)
        .header(pin(112))
        .body(json!({ "runner_id": 112, "leg_number": 2, "clock_time": 1800 }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Forbidden);
}

#[test]
fn unassigned_leg_is_rejected() {
    let client = client();
    let response = client
        .post("/api/entry/time")
        .header(ContentType::JSON)
        .header(pin(111))
        .body(json!({ "leg_number": 2, "clock_time": 1800 }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::BadRequest);
}

#[test]
fn captain_enters_times_for_the_van() {
    let client = client();
    let response = client
        .post("/api/entry/van")
        .header(ContentType::JSON)
        .header(pin(111))
        .header(Header::new("X-Role", "captain"))
        .body(json!({ "runner_id": 112, "leg_number": 2, "clock_time": 2100, "kills": 1 }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let legs: Value = client
        .get("/api/captain/legs")
        .header(pin(111))
        .header(Header::new("X-Role", "captain"))
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(legs["van_number"], 1);
    assert_eq!(legs["completed_legs"], json!([2]));
}

#[test]
fn admin_enters_any_time() {
    let client = client();
    let response = client
        .post("/api/entry/van")
        .header(ContentType::JSON)
        .header(Header::new("X-Admin-Key", "admin-secret"))
        .body(json!({ "runner_id": 621, "leg_number": 7, "clock_time": 1900 }).to_string())
        .dispatch();

    assert_eq!(response.status(), Status::Ok);
    let result: Value = response.into_json().unwrap();
    assert_eq!(result["entered_by"], "admin");
}

#[test]
fn runner_sees_their_own_legs() {
    let client = client();
    let body: Value = client
        .get("/api/runner/legs")
        .header(pin(111))
        .dispatch()
        .into_json()
        .unwrap();

    assert_eq!(body["runner"]["id"], 111);
    assert_eq!(body["legs"].as_array().unwrap().len(), 3);
    assert_eq!(body["next_leg"], 1);
}

#[test]
fn runners_are_not_captains() {
    let client = client();
    let response = client
        .get("/api/captain/legs")
        .header(pin(112))
        .header(Header::new("X-Role", "captain"))
        .dispatch();

    assert_eq!(response.status(), Status::Forbidden);
}

#[test]
fn search_needs_two_characters() {
    let client = client();

    let short: Value = client
        .get("/api/dashboard/runners/search?q=b")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(short, json!([]));

    let hits: Value = client
        .get("/api/dashboard/runners/search?q=blue%20van1")
        .dispatch()
        .into_json()
        .unwrap();
    let hits = hits.as_array().unwrap();
    assert_eq!(hits.len(), 6);
    assert!(hits.iter().all(|hit| hit["team_name"] == "BLUE"));
}

#[test]
fn unknown_runner_is_not_found() {
    let client = client();
    let response = client.get("/api/dashboard/runners/9999").dispatch();

    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["success"], false);
}

#[test]
fn team_detail_has_every_runner() {
    let client = client();
    let body: Value = client.get("/api/dashboard/team/2").dispatch().into_json().unwrap();

    assert_eq!(body["team"]["name"], "BLUE");
    assert_eq!(body["runners"].as_array().unwrap().len(), 12);
    assert_eq!(body["standing"]["completed_leg_count"], 0);
}

#[test]
fn stream_starts_with_the_latest_standings() {
    let client = client();
    let response = client.get("/api/dashboard/stream").dispatch();

    assert_eq!(response.status(), Status::Ok);
    let body = response.into_string().unwrap();
    assert!(body.starts_with("event: leaderboard:update"));
}

#[test]
fn cors_headers_only_for_known_origins() {
    let client = client();

    let allowed = client
        .get("/api/health")
        .header(Header::new("Origin", ORIGIN))
        .dispatch();
    assert_eq!(allowed.headers().get_one("Access-Control-Allow-Origin"), Some(ORIGIN));

    let other = client
        .get("/api/health")
        .header(Header::new("Origin", "https://elsewhere.example.org"))
        .dispatch();
    assert_eq!(other.headers().get_one("Access-Control-Allow-Origin"), None);

    let preflight = client
        .options("/api/entry/time")
        .header(Header::new("Origin", ORIGIN))
        .dispatch();
    assert_eq!(preflight.status(), Status::NoContent);
    assert!(preflight
        .headers()
        .get_one("Access-Control-Allow-Headers")
        .unwrap()
        .contains("X-Runner-Pin"));
}
