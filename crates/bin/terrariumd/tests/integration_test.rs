//! End-to-end smoke tests for the full terrariumd stack.
//!
//! Each test wires the real file storage under a scratch directory, the
//! virtual hardware, the controller and the command link, then talks to it
//! over TCP exactly like a serial bridge would.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use tempfile::TempDir;
use terrarium_adapter_link::{ETX, LinkListener};
use terrarium_adapter_storage_fs::{LifecycleFile, SettingsFile, TraceDirectory};
use terrarium_adapter_virtual::{VirtualPins, VirtualProbes};
use terrarium_app::command::{Command, CommandService, Response};
use terrarium_app::control_loop::ControlLoop;
use terrarium_app::controller::Controller;
use terrarium_app::ports::SettingsRepository;
use terrarium_app::shared::SharedController;
use terrarium_domain::settings::Settings;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::watch;

type Shared = SharedController<Arc<VirtualPins>, Arc<TraceDirectory>>;

struct Stack {
    dir: TempDir,
    addr: SocketAddr,
    controller: Shared,
    pins: Arc<VirtualPins>,
    probes: Arc<VirtualProbes>,
    lifecycle: Arc<LifecycleFile>,
    _shutdown: watch::Sender<bool>,
}

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 8)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

/// Build the full stack, started at 09:00 on a fixed day.
async fn stack() -> Stack {
    let dir = TempDir::new().unwrap();
    let settings = Arc::new(SettingsFile::new(dir.path().join("settings.json")));
    let lifecycle = Arc::new(LifecycleFile::new(dir.path().join("lifecycle.txt")));
    let traces = Arc::new(TraceDirectory::new(dir.path().join("trace")));
    let pins = Arc::new(VirtualPins::default());
    let probes = Arc::new(VirtualProbes::new(21, 25));

    let mut controller = Controller::new(Settings::default(), Arc::clone(&pins), Arc::clone(&traces));
    controller.start(at(9, 0, 0));
    let controller = SharedController::new(controller);

    let service = Arc::new(CommandService::new(
        controller.clone(),
        Arc::clone(&probes),
        settings,
        Arc::clone(&lifecycle),
        traces,
    ));
    let listener = LinkListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);
    tokio::spawn(listener.serve(service, rx));

    Stack {
        dir,
        addr,
        controller,
        pins,
        probes,
        lifecycle,
        _shutdown: tx,
    }
}

async fn send(stack: &Stack, cmd: &str, data: Option<Value>) -> Response {
    let stream = TcpStream::connect(stack.addr).await.unwrap();
    let (read, mut write) = stream.into_split();
    let mut frame = serde_json::to_vec(&Command::new(cmd, data)).unwrap();
    frame.push(ETX);
    write.write_all(&frame).await.unwrap();

    let mut reader = BufReader::new(read);
    let mut buf = Vec::new();
    reader.read_until(ETX, &mut buf).await.unwrap();
    assert_eq!(buf.pop(), Some(ETX));
    serde_json::from_slice(&buf).unwrap()
}

#[tokio::test]
async fn should_switch_virtual_pin_on_command() {
    let stack = stack().await;

    let response = send(&stack, "setDeviceOn", Some(json!({ "device": "light1" }))).await;
    assert!(response.error().is_none());
    assert_eq!(stack.pins.level(0), Some(true));

    let state = send(&stack, "getState", None).await.response.unwrap();
    assert_eq!(state["state"][0]["state"], "on");
    assert_eq!(state["state"][0]["on_period"], -1);
}

#[tokio::test]
async fn should_drive_active_low_device_low_when_on() {
    let stack = stack().await;
    send(&stack, "setDeviceOn", Some(json!({ "device": "pump" }))).await;
    assert_eq!(stack.pins.level(21), Some(false));
}

#[tokio::test]
async fn should_reject_unknown_command_over_the_link() {
    let stack = stack().await;
    let response = send(&stack, "selfDestruct", None).await;
    assert_eq!(response.command, "selfDestruct");
    assert_eq!(response.error(), Some("Command 'selfDestruct' is not implemented."));
}

#[tokio::test]
async fn should_persist_replaced_timers_to_disk() {
    let stack = stack().await;
    let timers = json!({ "timers": [{
        "device": "light1", "index": 1, "hour_on": 9, "minute_on": 0,
        "hour_off": 21, "minute_off": 0, "repeat": 1, "period": 0
    }] });
    let response = send(&stack, "replaceTimers", Some(timers)).await;
    assert!(response.error().is_none());

    let saved = SettingsFile::new(stack.dir.path().join("settings.json"))
        .load()
        .unwrap()
        .unwrap();
    let light1 = saved.timers.iter().find(|t| t.device == "light1").unwrap();
    assert_eq!((light1.hour_on, light1.hour_off), (9, 21));
    assert!(light1.is_enabled());

    let back = send(&stack, "getTimersForDevice", Some(json!({ "device": "light1" }))).await;
    assert_eq!(back.response.unwrap()["timers"][0]["hour_off"], 21);
}

#[tokio::test]
async fn should_count_down_and_persist_uv_lamp_hours() {
    let stack = stack().await;
    let response = send(
        &stack,
        "setLifecycleCounter",
        Some(json!({ "device": "uvlight", "hours": 4400 })),
    )
    .await;
    assert!(response.error().is_none());
    let path = stack.dir.path().join("lifecycle.txt");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "uvlight=4400\n");

    let mut control = ControlLoop::new(
        stack.controller.clone(),
        Arc::clone(&stack.probes),
        Arc::clone(&stack.lifecycle),
        at(9, 59, 59),
    );
    control.run_once(at(10, 0, 0));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "uvlight=4399\n");
}

#[tokio::test]
async fn should_list_and_serve_trace_files() {
    let stack = stack().await;
    send(&stack, "setDeviceOff", Some(json!({ "device": "light2" }))).await;

    let files = send(&stack, "getStateTracefiles", None).await.response.unwrap();
    assert_eq!(files["files"], json!(["state_20210108"]));

    let content = send(&stack, "getStateFile", Some(json!({ "fname": "state_20210108" })))
        .await
        .response
        .unwrap();
    assert!(
        content["content"]
            .as_str()
            .unwrap()
            .starts_with("2021-01-08 09:00:00 start")
    );

    let escape = send(&stack, "getStateFile", Some(json!({ "fname": "../settings.json" }))).await;
    assert!(escape.error().is_some());
}

#[tokio::test]
async fn should_report_pinned_sensor_values() {
    let stack = stack().await;
    send(
        &stack,
        "setSensors",
        Some(json!({ "roomtemp": 17, "terrtemp": 33 })),
    )
    .await;
    let sensors = send(&stack, "getSensors", None).await.response.unwrap();
    assert_eq!(sensors["sensors"][0]["temperature"], 17);
    assert_eq!(sensors["sensors"][1]["temperature"], 33);
}
