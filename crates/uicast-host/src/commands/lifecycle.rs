//! Document lifecycle and host control commands.
//!
//! These trigger one side effect on the runtime and reply `true` as soon
//! as the call is issued. Runtime failures are logged, never surfaced;
//! the IDE retries by reloading, not by inspecting error payloads.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use tracing::info;
use tracing::warn;
use uicast_capture::quality_for;
use uicast_runtime::LoadDocumentRequest;

use crate::command::Command;
use crate::command::CommandCx;

pub(crate) fn handlers() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(LoadDocument),
        Arc::new(ReloadRuntimePage),
        Arc::new(Restart),
        Arc::new(Exit),
        Arc::new(MemoryRefresh),
        Arc::new(Snapshot),
    ]
}

/// Loads a new document into the runtime. The capture session restarts
/// before the runtime hears about the load so a render callback from the
/// new document can never land in the previous session.
struct LoadDocument;

impl Command for LoadDocument {
    fn name(&self) -> &'static str {
        "LoadDocument"
    }

    fn validate_action(&self, cx: &CommandCx<'_>) -> bool {
        matches!(cx.arg_str("url"), Some(url) if !url.is_empty())
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        let Some(url) = cx.arg_str("url").map(str::to_string) else {
            return;
        };
        match cx.host().pipeline.begin_session() {
            Ok(generation) => info!(generation, url = %url, "capture session started"),
            Err(e) => warn!(error = %e, "capture session failed to start"),
        }
        let request = LoadDocumentRequest {
            url,
            class_name: cx.arg_str("className").map(str::to_string),
            preview_param: cx.arg("previewParam").cloned(),
        };
        if let Err(e) = cx.host().runtime.load_document(&request) {
            warn!(error = %e, "runtime rejected document load");
        }
        cx.reply(json!(true));
    }
}

struct ReloadRuntimePage;

impl Command for ReloadRuntimePage {
    fn name(&self) -> &'static str {
        "ReloadRuntimePage"
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        let page = cx.arg_str("url").unwrap_or_default().to_string();
        if let Err(e) = cx.host().runtime.reload_page(&page) {
            warn!(error = %e, "runtime rejected page reload");
        }
        cx.reply(json!(true));
    }
}

struct Restart;

impl Command for Restart {
    fn name(&self) -> &'static str {
        "Restart"
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        if let Err(e) = cx.host().runtime.restart() {
            warn!(error = %e, "runtime rejected restart");
        }
        cx.reply(json!(true));
    }
}

/// Stops the host. The reply goes out before the server loop observes the
/// shutdown flag, so the IDE sees an acknowledgement rather than a hangup.
struct Exit;

impl Command for Exit {
    fn name(&self) -> &'static str {
        "Exit"
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        info!("exit requested");
        if let Err(e) = cx.host().runtime.exit() {
            warn!(error = %e, "runtime exit failed");
        }
        cx.host().shutdown.store(true, Ordering::SeqCst);
        cx.reply(json!(true));
    }
}

/// Forwards an opaque memory pressure payload to the runtime.
struct MemoryRefresh;

impl Command for MemoryRefresh {
    fn name(&self) -> &'static str {
        "MemoryRefresh"
    }

    fn run_action(&self, cx: &mut CommandCx<'_>) {
        let payload = cx.args().clone();
        if let Err(e) = cx.host().runtime.memory_refresh(&payload) {
            warn!(error = %e, "runtime rejected memory refresh");
        }
        cx.reply(json!(true));
    }
}

/// Returns the most recent frame as base64. Prefers the streamer cache;
/// falls back to asking the runtime for a fresh snapshot when nothing has
/// been streamed yet.
struct Snapshot;

impl Command for Snapshot {
    fn name(&self) -> &'static str {
        "Snapshot"
    }

    fn run_get(&self, cx: &mut CommandCx<'_>) {
        if let Some(cached) = cx.host().streamer.last_frame() {
            cx.reply(json!({
                "data": BASE64.encode(cached.payload()),
                "width": cached.width,
                "height": cached.height,
            }));
            return;
        }
        let frame = match cx.host().runtime.snapshot() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "snapshot unavailable");
                cx.reply(json!(false));
                return;
            }
        };
        let quality = quality_for(frame.pixel_count());
        match cx
            .host()
            .encoder
            .encode(&frame.pixels, frame.width, frame.height, quality)
        {
            Ok(payload) => cx.reply(json!({
                "data": BASE64.encode(payload),
                "width": frame.width,
                "height": frame.height,
            })),
            Err(e) => {
                warn!(error = %e, "snapshot encode failed");
                cx.reply(json!(false));
            }
        }
    }
}
