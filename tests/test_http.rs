use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rgsu_timetable::timetable::config::{build_http_client, Config};
use rgsu_timetable::timetable::date_provider::{
    current_week_start_or_fallback, week_start, Clock, TimeApiClock,
};
use rgsu_timetable::timetable::errors::TimetableError;
use rgsu_timetable::timetable::groups_getter::GroupsGetter;
use rgsu_timetable::timetable::helpers::write_groups;
use rgsu_timetable::timetable::lesson_extractor::extract;
use rgsu_timetable::timetable::schedule_getter::{DayFetcher, RgsuClient};
use rgsu_timetable::timetable::weekly::build_week;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ONE_LESSON_HTML: &str = r#"
<div class="n-timetable-day__item">
    <span class="n-timetable-day__from">08:00</span>
    <span class="n-timetable-day__to">09:30</span>
    <article class="n-timetable-card">
        <h3 class="n-timetable-card__title">Математика</h3>
        <div class="n-timetable-card__category">Лекция</div>
        <div class="n-timetable-card__affiliation">Иванов И.И.</div>
    </article>
</div>
"#;

fn test_config(server: &MockServer) -> Config {
    Config {
        timetable_url: format!("{}/timetable", server.uri()),
        groups_url: format!("{}/groups", server.uri()),
        time_api_url: format!("{}/time", server.uri()),
        request_timeout_secs: 2,
        accept_invalid_certs: false,
        ..Config::default()
    }
}

fn test_client(server: &MockServer) -> RgsuClient {
    let config = test_config(server);
    RgsuClient::new(build_http_client(&config).unwrap(), config)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn groups_are_fetched_and_written_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/groups"))
        .and(header("user-agent", Config::default().user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"suggestions": ["Группа-1", "Группа-2"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let groups = test_client(&server).get_groups().await.unwrap();
    assert_eq!(groups, vec!["Группа-1", "Группа-2"]);

    let dir = tempfile::tempdir().unwrap();
    let groups_path = dir.path().join("groups.json");
    write_groups(&groups_path, &groups).unwrap();
    let text = std::fs::read_to_string(&groups_path).unwrap();
    assert!(text.contains("\"Группа-1\""));
    assert!(text.contains("\"Группа-2\""));
}

#[tokio::test]
async fn groups_without_suggestions_are_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(test_client(&server).get_groups().await.unwrap().is_empty());
}

/* an address nothing listens on */
fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn unreachable_directory_is_network_error() {
    let config = Config {
        groups_url: format!("{}/groups", closed_url()),
        request_timeout_secs: 2,
        ..Config::default()
    };
    let client = RgsuClient::new(build_http_client(&config).unwrap(), config);

    assert!(matches!(
        client.get_groups().await,
        Err(TimetableError::Network(_))
    ));
}

#[tokio::test]
async fn day_request_is_form_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("place=first"))
        .and(body_string_contains("mode=day"))
        .and(body_string_contains("date=2025-02-17"))
        .and(body_string_contains("week=8"))
        .and(body_string_contains("month=2"))
        .and(body_string_contains("year=2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"html": ONE_LESSON_HTML})))
        .expect(1)
        .mount(&server)
        .await;

    let html = test_client(&server)
        .fetch_day(date(2025, 2, 17), "ПИН-Б-0-Д-2022-1")
        .await
        .unwrap();
    let lessons = extract(&html, "2025-02-17").unwrap();

    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].time, "08:00 - 09:30");
    assert_eq!(lessons[0].subject, "Математика");
    assert_eq!(lessons[0].category, "Лекция");
    assert_eq!(lessons[0].teacher, "Иванов И.И.");
    assert_eq!(lessons[0].building, "");
    assert_eq!(lessons[0].address, "");
    assert_eq!(lessons[0].auditorium, "");
}

#[tokio::test]
async fn absent_html_yields_no_lessons() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let html = test_client(&server)
        .fetch_day(date(2025, 2, 17), "ПИН-Б-0-Д-2022-1")
        .await
        .unwrap();
    assert!(extract(&html, "2025-02-17").unwrap().is_empty());
}

#[tokio::test]
async fn non_json_day_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Технические работы</html>"))
        .mount(&server)
        .await;

    let result = test_client(&server)
        .fetch_day(date(2025, 2, 17), "ПИН-Б-0-Д-2022-1")
        .await;
    assert!(matches!(
        result,
        Err(TimetableError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn one_failing_day_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .and(body_string_contains("date=2025-02-19"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    /* Monday answers last */
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .and(body_string_contains("date=2025-02-17"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"html": ONE_LESSON_HTML}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"html": ""})))
        .mount(&server)
        .await;

    let report = build_week(&test_client(&server), "ПИН-Б-0-Д-2022-1", date(2025, 2, 17)).await;

    let dates = report.schedule.keys().cloned().collect::<Vec<_>>();
    assert_eq!(
        dates,
        vec![
            "2025-02-17",
            "2025-02-18",
            "2025-02-19",
            "2025-02-20",
            "2025-02-21",
            "2025-02-22",
            "2025-02-23"
        ]
    );
    assert_eq!(report.schedule["2025-02-17"].len(), 1);
    assert!(report.schedule["2025-02-19"].is_empty());
    assert_eq!(report.failed_dates(), vec!["2025-02-19".to_string()]);
    assert!(report.failures["2025-02-19"].starts_with("network error"));
}

#[tokio::test]
async fn time_api_date_is_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time"))
        .and(query_param("timeZone", "Europe/Moscow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"year": 2025, "month": 2, "day": 19, "hour": 12})),
        )
        .mount(&server)
        .await;

    let config = test_config(&server);
    let clock = TimeApiClock::new(
        build_http_client(&config).unwrap(),
        &config.time_api_url,
        &config.time_zone,
    );
    assert_eq!(clock.today().await.unwrap(), date(2025, 2, 19));
}

#[tokio::test]
async fn time_api_failure_is_time_source_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/time"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"year": 2025, "month": 13, "day": 1})))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let clock = TimeApiClock::new(
        build_http_client(&config).unwrap(),
        &config.time_api_url,
        &config.time_zone,
    );
    assert!(matches!(
        clock.today().await,
        Err(TimetableError::TimeSourceUnavailable(_))
    ));

    let unreachable = TimeApiClock::new(
        build_http_client(&config).unwrap(),
        &format!("{}/time", closed_url()),
        &config.time_zone,
    );
    assert!(matches!(
        unreachable.today().await,
        Err(TimetableError::TimeSourceUnavailable(_))
    ));
}

#[tokio::test]
async fn unreachable_time_api_anchors_on_configured_offset() {
    let config = Config {
        fallback_utc_offset_minutes: -11 * 60,
        ..Config::default()
    };
    let clock = TimeApiClock::new(
        build_http_client(&config).unwrap(),
        &format!("{}/time", closed_url()),
        &config.time_zone,
    )
    .with_fallback_offset(config.fallback_offset());

    let start = current_week_start_or_fallback(&clock).await;
    let expected = week_start(Utc::now().with_timezone(&config.fallback_offset()).date_naive());
    assert_eq!(start, expected);
}

#[tokio::test]
async fn slow_day_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .and(body_string_contains("date=2025-02-20"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"html": ONE_LESSON_HTML}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/timetable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"html": ONE_LESSON_HTML})))
        .mount(&server)
        .await;

    let config = Config {
        request_timeout_secs: 1,
        ..test_config(&server)
    };
    let client = RgsuClient::new(build_http_client(&config).unwrap(), config);

    let day = client.fetch_day(date(2025, 2, 20), "ПИН-Б-0-Д-2022-1").await;
    assert!(matches!(day, Err(TimetableError::Network(_))));

    let report = build_week(&client, "ПИН-Б-0-Д-2022-1", date(2025, 2, 17)).await;
    assert_eq!(report.failed_dates(), vec!["2025-02-20".to_string()]);
    assert!(report.failures["2025-02-20"].starts_with("network error"));
    assert!(report.schedule["2025-02-20"].is_empty());
    assert_eq!(report.schedule["2025-02-21"].len(), 1);
}
