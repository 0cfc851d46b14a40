use std::{cell::RefCell, rc::Rc, time::Duration};

use futures::executor::block_on;
use presence_bridge::{BridgeConfig, IframeBridge, PresenceBridge, PresenceOptions};
use presence_host::{
    BridgeError, EventBus, HostServices, ImmediateTimer, IframeUrlRequest, MemoryConsole,
    MemoryEventBus, MemoryPageScope, MemorySettingsStore, NeverTimer, ServiceMetadata,
    StaticHostInfo, GET_IFRAME_URL, IFRAME_URL, UPDATE_DATA,
};
use serde_json::{json, Value};

fn iframe_bridge(bus: &MemoryEventBus, timeout_ms: u64) -> IframeBridge {
    let config = BridgeConfig {
        request_timeout_ms: timeout_ms,
        ..BridgeConfig::default()
    };
    let timer: Rc<dyn presence_host::Timer> = if timeout_ms == 0 {
        Rc::new(ImmediateTimer)
    } else {
        Rc::new(NeverTimer)
    };
    IframeBridge::new(Rc::new(bus.clone()), timer, config).expect("iframe bridge")
}

fn main_bridge(bus: &MemoryEventBus) -> PresenceBridge {
    let metadata: ServiceMetadata = serde_json::from_value(json!({
        "author": {"name": "dev", "id": "1"},
        "service": "Player",
        "url": "player.example.com",
        "version": "1.0.0",
        "logo": "https://example.com/logo.png",
        "thumbnail": "https://example.com/thumb.png",
        "color": "#000",
        "category": "videos",
        "iframe": true,
        "iFrameRegExp": "embed[.]example[.]com"
    }))
    .expect("metadata");
    let services = HostServices {
        bus: Rc::new(bus.clone()),
        settings: Rc::new(MemorySettingsStore::default()),
        page: Rc::new(MemoryPageScope::new(bus.clone())),
        timer: Rc::new(NeverTimer),
        console: Rc::new(MemoryConsole::default()),
        host_info: Rc::new(StaticHostInfo("2.5.1".to_string())),
    };
    PresenceBridge::new(
        PresenceOptions::new("client-1"),
        metadata,
        BridgeConfig::default(),
        services,
    )
    .expect("main bridge")
}

#[test]
fn iframe_payload_reaches_main_frame_callback_verbatim() {
    // A relay between frames behaves like a shared bus for the protocol.
    let bus = MemoryEventBus::default();
    let main = main_bridge(&bus);
    let iframe = iframe_bridge(&bus, 1_000);
    let received: Rc<RefCell<Vec<Value>>> = Rc::default();
    let received_in = received.clone();
    main.on("iFrameData", move |payload| received_in.borrow_mut().push(payload));

    iframe.send(json!({"currentTime": 42.0, "duration": 180.0, "paused": false}));

    assert_eq!(
        *received.borrow(),
        vec![json!({"currentTime": 42.0, "duration": 180.0, "paused": false})]
    );
}

#[test]
fn get_url_resolves_from_host_reply() {
    let bus = MemoryEventBus::default();
    let reply_bus = bus.clone();
    bus.listen(
        GET_IFRAME_URL,
        Rc::new(move |detail| {
            let request: IframeUrlRequest = serde_json::from_value(detail).expect("request");
            reply_bus
                .dispatch(
                    IFRAME_URL,
                    json!({
                        "correlationId": request.correlation_id,
                        "url": "https://embed.example.com/v/1"
                    }),
                )
                .expect("reply");
        }),
    )
    .expect("listen");
    let iframe = iframe_bridge(&bus, 1_000);

    assert_eq!(
        block_on(iframe.get_url()),
        Ok("https://embed.example.com/v/1".to_string())
    );
    assert_eq!(iframe.pending_requests(), 0);
}

#[test]
fn get_url_times_out_without_host() {
    let bus = MemoryEventBus::default();
    let iframe = iframe_bridge(&bus, 0);

    assert_eq!(
        block_on(iframe.get_url()),
        Err(BridgeError::Timeout {
            event: GET_IFRAME_URL.to_string(),
            after: Duration::ZERO
        })
    );
    assert_eq!(iframe.pending_requests(), 0);
}

#[test]
fn update_data_reaches_latest_iframe_callback() {
    let bus = MemoryEventBus::default();
    let iframe = iframe_bridge(&bus, 1_000);
    let calls: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let first = calls.clone();
    let second = calls.clone();
    iframe.on("UpdateData", move |_| first.borrow_mut().push("first"));
    iframe.on("UpdateData", move |_| second.borrow_mut().push("second"));
    iframe.on("iFrameData", |_| panic!("iframes cannot subscribe to iframe data"));

    bus.dispatch(UPDATE_DATA, Value::Null).expect("dispatch");

    assert_eq!(*calls.borrow(), vec!["second"]);
}

#[test]
fn dropping_iframe_bridge_unsubscribes() {
    let bus = MemoryEventBus::default();
    let iframe = iframe_bridge(&bus, 1_000);
    assert_eq!(bus.listener_count(UPDATE_DATA), 1);
    drop(iframe);
    assert_eq!(bus.listener_count(UPDATE_DATA), 0);
    assert_eq!(bus.listener_count(IFRAME_URL), 0);
}
