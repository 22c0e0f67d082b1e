//! capture-bridge: camera session handle bridge for Tauri applications
//!
//! This crate sits between a host application and a native video engine. It
//! owns one native capture session per identifying context, hands out an
//! opaque handle to it, tracks which physical camera is active and releases
//! the session on teardown.
//!
//! # Features
//! - One owned native session per [`CameraController`]
//! - Opaque [`NativeHandle`]s resolved through a process-wide handle table
//! - Causal camera switches with timeout and in-flight rejection
//! - Reconciliation of engine-originated switches without hardware feedback
//! - Idempotent, switch-aware disposal
//!
//! # Usage
//! The video engine plugs in through [`SessionFactory`]:
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! fn main() {
//!     tauri::Builder::default()
//!         .plugin(capture_bridge::init_with_factory(Arc::new(MyEngineFactory::new())))
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
pub mod commands;
pub mod config;
pub mod controller;
pub mod errors;
pub mod handles;
pub mod session;
pub mod types;

// Testing utilities - mock capture sessions for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::BridgeConfig;
pub use controller::CameraController;
pub use errors::CameraError;
pub use session::{install_session_factory, CaptureSession, SessionFactory};
pub use types::{CameraFacing, ControllerStatus, NativeHandle};

use std::sync::Arc;
use tauri::{
    plugin::{Builder, TauriPlugin},
    Runtime,
};

/// Initialize the plugin with the globally installed session factory
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("capture-bridge")
        .invoke_handler(tauri::generate_handler![
            commands::bridge::get_platform_version,
            commands::bridge::native_init,
            commands::bridge::native_dispose,
            commands::bridge::get_native_handle,
            commands::bridge::switch_camera,
            commands::bridge::notify_camera_switch,
            commands::bridge::sync_camera_facing,
            commands::bridge::get_camera_facing,
            commands::bridge::get_controller_status,
            commands::bridge::get_bridge_config,
            commands::bridge::update_bridge_config,
        ])
        .on_drop(|_app| {
            commands::bridge::dispose_active_controller();
        })
        .build()
}

/// Install `factory` and initialize the plugin
pub fn init_with_factory<R: Runtime>(factory: Arc<dyn SessionFactory>) -> TauriPlugin<R> {
    install_session_factory(factory);
    init()
}

/// Initialize logging for the bridge
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "capture_bridge=info");
    }
    let _ = env_logger::try_init();
}
