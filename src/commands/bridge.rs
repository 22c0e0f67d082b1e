use crate::config::BridgeConfig;
use crate::controller::CameraController;
use crate::session::installed_session_factory;
use crate::types::{CameraFacing, ControllerStatus};
use std::sync::{Arc, RwLock};
use tauri::command;

// One active controller per process, mirroring the host's single capture view.
lazy_static::lazy_static! {
    static ref ACTIVE_CONTROLLER: RwLock<Option<Arc<CameraController>>> = RwLock::new(None);
    static ref GLOBAL_CONFIG: RwLock<BridgeConfig> = RwLock::new(BridgeConfig::load_or_default());
}

// Held across every init/dispose so the slot never lags behind a native session.
static LIFECYCLE_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

fn active_controller() -> Result<Arc<CameraController>, String> {
    ACTIVE_CONTROLLER
        .read()
        .map_err(|e| e.to_string())?
        .clone()
        .ok_or_else(|| "No active capture session; call native_init first".to_string())
}

fn take_active_controller() -> Option<Arc<CameraController>> {
    ACTIVE_CONTROLLER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
}

/// Dispose the active controller, if any. Used when the plugin is torn down.
pub fn dispose_active_controller() {
    if let Some(controller) = take_active_controller() {
        controller.dispose();
    }
}

/// Host platform description
#[command]
pub async fn get_platform_version() -> Result<String, String> {
    Ok(format!(
        "{} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    ))
}

/// Create the capture session for `app_id` and return its native handle
#[command]
pub async fn native_init(app_id: String) -> Result<u64, String> {
    if app_id.trim().is_empty() {
        return Err("App ID is required".to_string());
    }

    let _lifecycle = LIFECYCLE_LOCK.lock().await;
    log::info!("Initializing capture session for app id '{}'", app_id);

    let factory = installed_session_factory().map_err(|e| e.to_string())?;
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?.clone();
    let previous = take_active_controller();

    let controller = tokio::task::spawn_blocking(move || {
        if let Some(previous) = previous {
            log::info!(
                "Disposing previous capture session '{}'",
                previous.identifying_context()
            );
            previous.dispose();
        }
        CameraController::with_config(&app_id, factory.as_ref(), &config)
    })
    .await
    .map_err(|e| format!("Task join error: {}", e))?
    .map_err(|e| {
        log::error!("Failed to initialize capture session: {}", e);
        format!("Failed to initialize: {}", e)
    })?;

    let handle = controller.native_handle().map_err(|e| e.to_string())?;
    *ACTIVE_CONTROLLER.write().map_err(|e| e.to_string())? = Some(Arc::new(controller));
    Ok(handle.raw())
}

/// Release the active capture session. Succeeds when nothing is active.
#[command]
pub async fn native_dispose() -> Result<bool, String> {
    let _lifecycle = LIFECYCLE_LOCK.lock().await;
    if let Some(controller) = take_active_controller() {
        tokio::task::spawn_blocking(move || controller.dispose())
            .await
            .map_err(|e| format!("Failed to dispose: {}", e))?;
    }
    Ok(true)
}

#[command]
pub async fn get_native_handle() -> Result<u64, String> {
    let controller = active_controller()?;
    controller
        .native_handle()
        .map(|handle| handle.raw())
        .map_err(|e| e.to_string())
}

/// Switch to the other physical camera
#[command]
pub async fn switch_camera() -> Result<CameraFacing, String> {
    let controller = active_controller()?;
    tokio::task::spawn_blocking(move || controller.switch_camera())
        .await
        .map_err(|e| format!("Task join error: {}", e))?
        .map_err(|e| {
            log::error!("Failed to switch camera: {}", e);
            e.to_string()
        })
}

/// Tell the bridge the engine switched cameras by itself
#[command]
pub async fn notify_camera_switch() -> Result<CameraFacing, String> {
    let controller = active_controller()?;
    controller.notify_camera_switch();
    Ok(controller.facing())
}

/// Tell the bridge which camera the engine reports as active
#[command]
pub async fn sync_camera_facing(front: bool) -> Result<CameraFacing, String> {
    let controller = active_controller()?;
    controller.sync_camera_facing(CameraFacing::from_front(front));
    Ok(controller.facing())
}

#[command]
pub async fn get_camera_facing() -> Result<CameraFacing, String> {
    Ok(active_controller()?.facing())
}

#[command]
pub async fn get_controller_status() -> Result<ControllerStatus, String> {
    Ok(active_controller()?.status())
}

#[command]
pub async fn get_bridge_config() -> Result<BridgeConfig, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.clone())
}

/// Replace the configuration used by subsequent `native_init` calls
#[command]
pub async fn update_bridge_config(new_config: BridgeConfig) -> Result<(), String> {
    new_config.validate()?;
    *GLOBAL_CONFIG.write().map_err(|e| e.to_string())? = new_config;
    Ok(())
}
