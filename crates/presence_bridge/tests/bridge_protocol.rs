use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
    time::Duration,
};

use futures::{executor::block_on, future::join};
use pretty_assertions::assert_eq;
use presence_bridge::{BridgeConfig, ExtensionVersion, PresenceBridge, PresenceOptions};
use presence_host::{
    BridgeError, DiagnosticLevel, EventBus, HostServices, ImmediateTimer, MemoryConsole,
    MemoryEventBus, MemoryPageScope, MemorySettingsStore, NeverTimer, PresenceButton,
    PresenceData, ServiceMetadata, StaticHostInfo, StringsRequest, Timer, VariableKind,
    PAGE_VARIABLE, RECEIVE_EXTENSION_DATA, REQUEST_EXTENSION_DATA, TAB_PRIORITY, UPDATE_DATA,
    UPDATE_PRESENCE,
};
use serde_json::{json, Value};

fn metadata(color: &str) -> ServiceMetadata {
    serde_json::from_value(json!({
        "author": {"name": "dev", "id": "1"},
        "service": "Example",
        "description": {"en": "Example service"},
        "url": "example.com",
        "version": "1.0.0",
        "logo": "https://example.com/logo.png",
        "thumbnail": "https://example.com/thumb.png",
        "color": color,
        "category": "videos",
        "settings": [
            {"id": "buttons", "title": "Show Buttons", "icon": "fas fa-hand", "value": true},
            {"id": "privacy", "title": "Privacy", "icon": "fas fa-eye", "value": false}
        ]
    }))
    .expect("metadata should parse")
}

struct Harness {
    bus: MemoryEventBus,
    settings: MemorySettingsStore,
    page: MemoryPageScope,
    console: MemoryConsole,
    bridge: PresenceBridge,
}

fn harness_with(timer: Rc<dyn Timer>, version: &str) -> Harness {
    let bus = MemoryEventBus::default();
    let settings = MemorySettingsStore::default();
    let page = MemoryPageScope::new(bus.clone());
    let console = MemoryConsole::default();
    let services = HostServices {
        bus: Rc::new(bus.clone()),
        settings: Rc::new(settings.clone()),
        page: Rc::new(page.clone()),
        timer,
        console: Rc::new(console.clone()),
        host_info: Rc::new(StaticHostInfo(version.to_string())),
    };
    let bridge = PresenceBridge::new(
        PresenceOptions::new("client-1"),
        metadata("#5865f2"),
        BridgeConfig::default(),
        services,
    )
    .expect("bridge should construct");
    Harness {
        bus,
        settings,
        page,
        console,
        bridge,
    }
}

fn harness() -> Harness {
    harness_with(Rc::new(NeverTimer), "2.5.1")
}

/// Host that translates every requested string id to upper case.
fn serve_strings(bus: &MemoryEventBus) {
    let reply_bus = bus.clone();
    bus.listen(
        REQUEST_EXTENSION_DATA,
        Rc::new(move |detail| {
            let request: StringsRequest = serde_json::from_value(detail).expect("request shape");
            let strings: BTreeMap<String, String> = request
                .strings
                .into_iter()
                .map(|(key, id)| (key, id.to_uppercase()))
                .collect();
            reply_bus
                .dispatch(
                    RECEIVE_EXTENSION_DATA,
                    json!({"correlationId": request.correlation_id, "strings": strings}),
                )
                .expect("reply");
        }),
    )
    .expect("listen");
}

fn song() -> PresenceData {
    PresenceData {
        details: Some("Song".to_string()),
        state: Some("Artist".to_string()),
        start_timestamp: Some(100),
        end_timestamp: Some(300),
        large_image_key: Some("logo".to_string()),
        small_image_key: Some("play".to_string()),
        small_image_text: Some("Playing".to_string()),
        buttons: vec![PresenceButton {
            label: "Listen".to_string(),
            url: "https://example.com/song".to_string(),
        }],
        ..PresenceData::default()
    }
}

#[test]
fn set_activity_broadcasts_snapshot_and_echoes_locally() {
    let h = harness();
    h.bridge.set_tray_title("Song - Artist");
    h.bridge.set_activity(song(), true);

    assert_eq!(h.bridge.get_activity(), song());
    assert_eq!(
        h.bus.dispatched_for(UPDATE_PRESENCE),
        vec![json!({
            "clientId": "client-1",
            "presenceData": {
                "details": "Song",
                "state": "Artist",
                "startTimestamp": 100,
                "endTimestamp": 300,
                "largeImageKey": "logo",
                "smallImageKey": "play",
                "smallImageText": "Playing",
                "buttons": [{"label": "Listen", "url": "https://example.com/song"}]
            },
            "trayTitle": "Song - Artist",
            "playback": true
        })]
    );
}

#[test]
fn tray_title_waits_for_next_update() {
    let h = harness();
    h.bridge.set_activity(PresenceData::default(), false);
    h.bridge.set_tray_title("Later");
    assert_eq!(h.bus.dispatched_for(UPDATE_PRESENCE).len(), 1);

    h.bridge.set_activity(PresenceData::default(), false);
    let sent = h.bus.dispatched_for(UPDATE_PRESENCE);
    assert_eq!(sent[0]["trayTitle"], json!(""));
    assert_eq!(sent[1]["trayTitle"], json!("Later"));
}

#[test]
fn clear_activity_is_idempotent() {
    let h = harness();
    h.bridge.set_tray_title("Title");
    h.bridge.set_activity(song(), true);
    h.bridge.clear_activity();
    h.bridge.clear_activity();

    let sent = h.bus.dispatched_for(UPDATE_PRESENCE);
    let cleared = json!({"presenceData": {}, "playback": false, "hidden": true});
    assert_eq!(sent[1], cleared);
    assert_eq!(sent[2], cleared);
    assert!(h.bridge.get_activity().is_empty());

    h.bridge.set_activity(PresenceData::default(), true);
    assert_eq!(h.bus.dispatched_for(UPDATE_PRESENCE)[3]["trayTitle"], json!(""));
}

#[test]
fn losing_tab_priority_clears_activity() {
    let h = harness();
    h.bridge.set_activity(song(), true);

    h.bus.dispatch(TAB_PRIORITY, json!(true)).expect("dispatch");
    assert_eq!(h.bridge.get_activity(), song());

    h.bus.dispatch(TAB_PRIORITY, json!(false)).expect("dispatch");
    assert!(h.bridge.get_activity().is_empty());
    let sent = h.bus.dispatched_for(UPDATE_PRESENCE);
    assert_eq!(sent.last(), Some(&json!({"presenceData": {}, "playback": false, "hidden": true})));
}

#[test]
fn get_strings_round_trips_through_host() {
    let h = harness();
    serve_strings(&h.bus);
    let template = BTreeMap::from([
        ("play".to_string(), "general.playing".to_string()),
        ("pause".to_string(), "general.paused".to_string()),
    ]);

    let strings = block_on(h.bridge.get_strings(&template, Some("de"))).expect("strings");

    assert_eq!(strings["play"], "GENERAL.PLAYING");
    assert_eq!(strings["pause"], "GENERAL.PAUSED");
    let requests = h.bus.dispatched_for(REQUEST_EXTENSION_DATA);
    let request = &requests[0];
    assert_eq!(request["language"], json!("de"));
    assert!(request["correlationId"].is_string());
    assert_eq!(h.bridge.pending_requests(), 0);
}

#[test]
fn concurrent_requests_are_paired_by_correlation_id() {
    let h = harness();
    let held: Rc<RefCell<Vec<StringsRequest>>> = Rc::default();
    let reply_bus = h.bus.clone();
    let held_in = held.clone();
    h.bus
        .listen(
            REQUEST_EXTENSION_DATA,
            Rc::new(move |detail| {
                let request: StringsRequest = serde_json::from_value(detail).expect("request");
                held_in.borrow_mut().push(request);
                if held_in.borrow().len() < 2 {
                    return;
                }
                // Answer the second request first.
                let requests: Vec<StringsRequest> = held_in.borrow_mut().drain(..).rev().collect();
                for request in requests {
                    let id = request.strings.values().next().cloned().unwrap_or_default();
                    reply_bus
                        .dispatch(
                            RECEIVE_EXTENSION_DATA,
                            json!({
                                "correlationId": request.correlation_id,
                                "strings": {"value": format!("reply to {id}")}
                            }),
                        )
                        .expect("reply");
                }
            }),
        )
        .expect("listen");

    let first = BTreeMap::from([("value".to_string(), "first".to_string())]);
    let second = BTreeMap::from([("value".to_string(), "second".to_string())]);
    let (a, b) = block_on(join(
        h.bridge.get_strings(&first, None),
        h.bridge.get_strings(&second, None),
    ));

    assert_eq!(a.expect("first")["value"], "reply to first");
    assert_eq!(b.expect("second")["value"], "reply to second");
    assert_eq!(h.bridge.pending_requests(), 0);
}

#[test]
fn replies_only_settle_requests_of_their_own_event() {
    let h = harness();
    let reply_bus = h.bus.clone();
    h.bus
        .listen(
            REQUEST_EXTENSION_DATA,
            Rc::new(move |detail| {
                let request: StringsRequest = serde_json::from_value(detail).expect("request");
                // A page script reusing the id on the page-variable channel.
                reply_bus
                    .dispatch(
                        PAGE_VARIABLE,
                        json!({
                            "correlationId": request.correlation_id,
                            "kind": "string",
                            "value": "forged"
                        }),
                    )
                    .expect("forged reply");
                reply_bus
                    .dispatch(
                        RECEIVE_EXTENSION_DATA,
                        json!({
                            "correlationId": request.correlation_id,
                            "strings": {"play": "Playing"}
                        }),
                    )
                    .expect("reply");
            }),
        )
        .expect("listen");
    let template = BTreeMap::from([("play".to_string(), "general.playing".to_string())]);

    let strings = block_on(h.bridge.get_strings(&template, None)).expect("strings");

    assert_eq!(strings["play"], "Playing");
    assert_eq!(h.bridge.pending_requests(), 0);
}

#[test]
fn unanswered_request_times_out_and_cleans_up() {
    let h = harness_with(Rc::new(ImmediateTimer), "2.5.1");
    let template = BTreeMap::from([("a".to_string(), "b".to_string())]);

    let result = block_on(h.bridge.get_strings(&template, None));

    assert_eq!(
        result,
        Err(BridgeError::Timeout {
            event: REQUEST_EXTENSION_DATA.to_string(),
            after: Duration::from_millis(10_000)
        })
    );
    assert_eq!(h.bridge.pending_requests(), 0);
}

#[test]
fn stray_reply_after_timeout_is_dropped() {
    let h = harness_with(Rc::new(ImmediateTimer), "2.5.1");
    let template = BTreeMap::new();
    let _ = block_on(h.bridge.get_strings(&template, None));
    let requests = h.bus.dispatched_for(REQUEST_EXTENSION_DATA);
    let request = &requests[0];

    h.bus
        .dispatch(
            RECEIVE_EXTENSION_DATA,
            json!({"correlationId": request["correlationId"], "strings": {}}),
        )
        .expect("late reply");
    assert_eq!(h.bridge.pending_requests(), 0);
}

#[test]
fn page_variables_decode_by_kind() {
    let h = harness();
    h.page.set_global("title", &json!("Episode 1"));
    h.page.set_global("player", &json!({"time": 12.5, "paused": false}));
    h.page.set_serialized("broken", VariableKind::Json, "{not json");

    let title: String = block_on(h.bridge.get_page_variable("title")).expect("string global");
    let player: Value = block_on(h.bridge.get_page_variable("player")).expect("object global");
    let missing: Option<u32> = block_on(h.bridge.get_page_variable("missing")).expect("null");
    let broken = block_on(h.bridge.get_page_variable::<Value>("broken"));

    assert_eq!(title, "Episode 1");
    assert_eq!(player, json!({"time": 12.5, "paused": false}));
    assert_eq!(missing, None);
    assert!(matches!(broken, Err(BridgeError::Decode(_))));
    assert_eq!(h.bridge.pending_requests(), 0);
}

#[test]
fn extension_version_is_verbatim_or_digits() {
    let h = harness();
    assert_eq!(
        h.bridge.get_extension_version(true),
        Ok(ExtensionVersion::Numeric(251))
    );
    assert_eq!(
        h.bridge.get_extension_version(false),
        Ok(ExtensionVersion::Raw("2.5.1".to_string()))
    );

    let h = harness_with(Rc::new(NeverTimer), "dev");
    assert_eq!(
        h.bridge.get_extension_version(true),
        Err(BridgeError::InvalidVersion("dev".to_string()))
    );
}

#[test]
fn settings_resolve_and_toggle_through_bridge() {
    let h = harness();
    h.settings.insert_raw(
        "pSettings_Example",
        r#"[{"id":"privacy","value":true,"hidden":false}]"#,
    );

    assert_eq!(block_on(h.bridge.get_setting("buttons")), Ok(json!(true)));
    assert_eq!(block_on(h.bridge.get_setting("privacy")), Ok(json!(true)));
    assert_eq!(
        block_on(h.bridge.get_setting("unknown")),
        Err(BridgeError::SettingNotFound("unknown".to_string()))
    );

    assert_eq!(
        block_on(h.bridge.hide_setting(["privacy", "missing"])),
        Err(BridgeError::PartialFailure {
            missing: vec!["missing".to_string()]
        })
    );
    assert_eq!(
        h.settings.raw("pSettings_Example").as_deref(),
        Some(r#"[{"id":"privacy","value":true,"hidden":true}]"#)
    );
    block_on(h.bridge.show_setting("privacy")).expect("show");
    assert_eq!(
        h.settings.raw("pSettings_Example").as_deref(),
        Some(r#"[{"id":"privacy","value":true,"hidden":false}]"#)
    );
}

#[test]
fn callbacks_replace_instead_of_accumulating() {
    let h = harness();
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));
    let first_in = first.clone();
    let second_in = second.clone();
    h.bridge.on("UpdateData", move |_| first_in.set(first_in.get() + 1));
    h.bridge.on("UpdateData", move |payload| {
        assert_eq!(payload, Value::Null);
        second_in.set(second_in.get() + 1);
    });

    h.bus.dispatch(UPDATE_DATA, Value::Null).expect("dispatch");

    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
}

#[test]
fn unknown_event_names_only_log() {
    let h = harness();
    h.bridge.on("Nope", |_| panic!("never subscribed"));
    assert_eq!(
        h.console.messages(DiagnosticLevel::Error),
        vec!["Nope is not a valid event name".to_string()]
    );
}

#[test]
fn diagnostics_carry_service_theme() {
    let h = harness();
    h.bridge.info("ready");
    h.bridge.success("updated");
    h.bridge.error("failed");

    let lines = h.console.lines();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| line.service == "Example"));
    assert!(lines.iter().all(|line| line.background == "#5865f2"));
    assert!(lines.iter().all(|line| line.foreground == "white"));
    assert_eq!(lines[1].level, DiagnosticLevel::Success);
}

#[test]
fn malformed_service_color_fails_construction() {
    let bus = MemoryEventBus::default();
    let services = HostServices {
        bus: Rc::new(bus.clone()),
        settings: Rc::new(MemorySettingsStore::default()),
        page: Rc::new(MemoryPageScope::new(bus.clone())),
        timer: Rc::new(NeverTimer),
        console: Rc::new(MemoryConsole::default()),
        host_info: Rc::new(StaticHostInfo("1".to_string())),
    };

    let result = PresenceBridge::new(
        PresenceOptions::new("client-1"),
        metadata("crimson"),
        BridgeConfig::default(),
        services,
    );

    assert!(matches!(result, Err(BridgeError::InvalidColor(color)) if color == "crimson"));
    assert_eq!(bus.listener_count(TAB_PRIORITY), 0);
}

#[test]
fn dropping_last_clone_unsubscribes() {
    let h = harness();
    let clone = h.bridge.clone();
    drop(h.bridge);
    assert_eq!(h.bus.listener_count(TAB_PRIORITY), 1);
    drop(clone);
    assert_eq!(h.bus.listener_count(TAB_PRIORITY), 0);
    assert_eq!(h.bus.listener_count(UPDATE_DATA), 0);
}
