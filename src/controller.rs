//! Camera session handle controller
//!
//! A [`CameraController`] owns one native capture session for an identifying
//! context. It distinguishes two ways the active camera can change:
//!
//! - [`CameraController::switch_camera`] commands the native session to switch
//!   (the controller causes the change).
//! - [`CameraController::notify_camera_switch`] and
//!   [`CameraController::sync_camera_facing`] only update tracked state after
//!   the engine switched on its own (the controller learns about the change).
//!
//! Keeping the two apart means an engine-originated switch never feeds back
//! into another hardware switch request.
//!
//! Facing, disposal and the in-flight flag share one mutex. The native switch
//! runs on a worker thread that holds only the session mutex, so the state lock
//! is never held across a native call.

use crate::config::BridgeConfig;
use crate::errors::CameraError;
use crate::handles;
use crate::session::{CaptureSession, SessionFactory};
use crate::types::{CameraFacing, ControllerStatus, NativeHandle};
use chrono::{DateTime, Utc};
use crossbeam_channel::RecvTimeoutError;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
struct ControllerState {
    facing: CameraFacing,
    disposed: bool,
    switch_in_flight: bool,
}

struct Shared {
    state: Mutex<ControllerState>,
    switch_done: Condvar,
    session: Mutex<Option<Box<dyn CaptureSession>>>,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Box<dyn CaptureSession>>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the session out before releasing, so only the first caller releases.
    fn release_session(&self, identifying_context: &str) {
        let session = self.lock_session().take();
        if let Some(mut session) = session {
            match session.release() {
                Ok(()) => log::debug!("Released capture session for '{}'", identifying_context),
                Err(e) => log::warn!(
                    "Error releasing capture session for '{}': {}",
                    identifying_context,
                    e
                ),
            }
        }
    }
}

/// Owner of one native capture session and its tracked camera facing
pub struct CameraController {
    identifying_context: String,
    native_handle: NativeHandle,
    shared: Arc<Shared>,
    switch_timeout: Duration,
    dispose_wait_timeout: Duration,
    created_at: DateTime<Utc>,
}

impl CameraController {
    /// Create a controller with default configuration
    pub fn new(
        identifying_context: &str,
        factory: &dyn SessionFactory,
    ) -> Result<Self, CameraError> {
        Self::with_config(identifying_context, factory, &BridgeConfig::default())
    }

    /// Create a controller, attaching a native session for `identifying_context`.
    ///
    /// Fails with [`CameraError::InitializationError`] when the context is empty
    /// or the factory cannot produce a session. Nothing is registered on failure.
    pub fn with_config(
        identifying_context: &str,
        factory: &dyn SessionFactory,
        config: &BridgeConfig,
    ) -> Result<Self, CameraError> {
        if identifying_context.trim().is_empty() {
            return Err(CameraError::InitializationError(
                "identifying context is required".to_string(),
            ));
        }

        let mut session = factory
            .create(identifying_context)
            .map_err(|e| match e {
                CameraError::InitializationError(_) => e,
                other => CameraError::InitializationError(other.to_string()),
            })?;

        let address = session.native_address();
        if address == 0 {
            if let Err(e) = session.release() {
                log::warn!("Error releasing rejected capture session: {}", e);
            }
            return Err(CameraError::InitializationError(format!(
                "capture session for '{}' reported a null native address",
                identifying_context
            )));
        }

        let native_handle = handles::register(address, identifying_context);
        let facing = config.camera.default_facing;

        log::info!(
            "Camera controller created for '{}' (handle {}, facing {})",
            identifying_context,
            native_handle,
            facing
        );

        Ok(Self {
            identifying_context: identifying_context.to_string(),
            native_handle,
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState {
                    facing,
                    disposed: false,
                    switch_in_flight: false,
                }),
                switch_done: Condvar::new(),
                session: Mutex::new(Some(session)),
            }),
            switch_timeout: config.switch_timeout(),
            dispose_wait_timeout: config.dispose_wait_timeout(),
            created_at: Utc::now(),
        })
    }

    pub fn identifying_context(&self) -> &str {
        &self.identifying_context
    }

    /// Handle of the native session.
    ///
    /// Stable for the controller's lifetime. After [`dispose`](Self::dispose)
    /// this returns [`CameraError::UseAfterDispose`], never the old handle.
    pub fn native_handle(&self) -> Result<NativeHandle, CameraError> {
        if self.shared.lock_state().disposed {
            return Err(CameraError::UseAfterDispose);
        }
        Ok(self.native_handle)
    }

    /// Best-known active camera
    pub fn facing(&self) -> CameraFacing {
        self.shared.lock_state().facing
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.lock_state().disposed
    }

    pub fn status(&self) -> ControllerStatus {
        let state = *self.shared.lock_state();
        ControllerStatus {
            identifying_context: self.identifying_context.clone(),
            native_handle: (!state.disposed).then_some(self.native_handle),
            facing: state.facing,
            disposed: state.disposed,
            switch_in_flight: state.switch_in_flight,
            created_at: self.created_at,
        }
    }

    /// Physically switch to the other camera and return the new facing.
    ///
    /// Blocks until the native switch finishes or the configured switch timeout
    /// elapses. A request made while another switch is running is rejected with
    /// [`CameraError::SwitchInProgress`]. On failure or timeout the tracked
    /// facing is unchanged; a switch that completes after its caller timed out
    /// still updates the facing when it lands.
    pub fn switch_camera(&self) -> Result<CameraFacing, CameraError> {
        let target = {
            let mut state = self.shared.lock_state();
            if state.disposed {
                return Err(CameraError::UseAfterDispose);
            }
            if state.switch_in_flight {
                return Err(CameraError::SwitchInProgress);
            }
            state.switch_in_flight = true;
            state.facing.toggled()
        };

        log::debug!(
            "Switching camera for '{}' to {}",
            self.identifying_context,
            target
        );

        let (tx, rx) = crossbeam_channel::bounded(1);
        let shared = Arc::clone(&self.shared);
        let context = self.identifying_context.clone();
        let spawned = std::thread::Builder::new()
            .name("capture-bridge-switch".to_string())
            .spawn(move || {
                let result = run_native_switch(&shared, &context, target);
                let _ = tx.send(result);
            });

        if let Err(e) = spawned {
            let mut state = self.shared.lock_state();
            state.switch_in_flight = false;
            self.shared.switch_done.notify_all();
            return Err(CameraError::SwitchFailed(format!(
                "failed to spawn switch worker: {}",
                e
            )));
        }

        match rx.recv_timeout(self.switch_timeout) {
            Ok(Ok(())) => {
                log::debug!(
                    "Camera for '{}' switched to {}",
                    self.identifying_context,
                    target
                );
                Ok(target)
            }
            Ok(Err(e)) => {
                log::warn!(
                    "Camera switch for '{}' failed: {}",
                    self.identifying_context,
                    e
                );
                Err(CameraError::SwitchFailed(e.to_string()))
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "Camera switch for '{}' did not complete within {:?}",
                    self.identifying_context,
                    self.switch_timeout
                );
                Err(CameraError::SwitchFailed(format!(
                    "native switch timed out after {:?}",
                    self.switch_timeout
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(CameraError::SwitchFailed(
                "switch worker exited without a result".to_string(),
            )),
        }
    }

    /// Record that the engine switched cameras on its own.
    ///
    /// Toggles the tracked facing without touching the native session. The
    /// caller is trusted: notifying when no switch happened desynchronizes the
    /// tracked facing from the hardware. No-op after disposal.
    pub fn notify_camera_switch(&self) {
        let mut state = self.shared.lock_state();
        if state.disposed {
            log::warn!(
                "Ignoring camera switch notification for disposed controller '{}'",
                self.identifying_context
            );
            return;
        }
        state.facing = state.facing.toggled();
        log::debug!(
            "Camera switch notified for '{}', facing now {}",
            self.identifying_context,
            state.facing
        );
    }

    /// Record the facing the engine reports, e.g. from a captured frame's source.
    ///
    /// Like [`notify_camera_switch`](Self::notify_camera_switch) this never
    /// touches the native session. No-op after disposal.
    pub fn sync_camera_facing(&self, facing: CameraFacing) {
        let mut state = self.shared.lock_state();
        if state.disposed {
            log::warn!(
                "Ignoring facing sync for disposed controller '{}'",
                self.identifying_context
            );
            return;
        }
        if state.facing != facing {
            log::debug!(
                "Facing for '{}' synced from {} to {}",
                self.identifying_context,
                state.facing,
                facing
            );
        }
        state.facing = facing;
    }

    /// Release the native session. Safe to call any number of times.
    ///
    /// If a switch is running, waits for it up to the configured dispose wait;
    /// past that the switch worker releases the session once the native call
    /// returns. The session is never released while a switch runs on it.
    pub fn dispose(&self) {
        let in_flight = {
            let mut state = self.shared.lock_state();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.switch_in_flight
        };

        handles::unregister(self.native_handle);

        if in_flight {
            let state = self.shared.lock_state();
            let (state, _) = self
                .shared
                .switch_done
                .wait_timeout_while(state, self.dispose_wait_timeout, |s| s.switch_in_flight)
                .unwrap_or_else(PoisonError::into_inner);
            if state.switch_in_flight {
                log::warn!(
                    "Switch still running for '{}', release deferred to switch worker",
                    self.identifying_context
                );
                return;
            }
        }

        self.shared.release_session(&self.identifying_context);
        log::info!("Camera controller for '{}' disposed", self.identifying_context);
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for CameraController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.shared.lock_state();
        f.debug_struct("CameraController")
            .field("identifying_context", &self.identifying_context)
            .field("native_handle", &self.native_handle)
            .field("facing", &state.facing)
            .field("disposed", &state.disposed)
            .finish()
    }
}

fn run_native_switch(
    shared: &Shared,
    identifying_context: &str,
    target: CameraFacing,
) -> Result<(), CameraError> {
    let result = {
        let mut session = shared.lock_session();
        match session.as_mut() {
            Some(session) => session.switch_camera(target),
            None => Err(CameraError::UseAfterDispose),
        }
    };

    let disposed = {
        let mut state = shared.lock_state();
        state.switch_in_flight = false;
        if result.is_ok() {
            state.facing = target;
        }
        shared.switch_done.notify_all();
        state.disposed
    };

    if disposed {
        shared.release_session(identifying_context);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSessionFactory;
    use std::time::Instant;

    fn back_config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.camera.default_facing = CameraFacing::Back;
        config
    }

    #[test]
    fn test_construct_exposes_live_handle() {
        let factory = MockSessionFactory::new();
        let controller = CameraController::new("unit-construct", &factory).unwrap();
        let handle = controller.native_handle().unwrap();
        assert_ne!(handle.raw(), 0);
        assert!(handles::resolve(handle).is_some());
        assert_eq!(controller.facing(), CameraFacing::Front);
        assert_eq!(factory.created_contexts(), vec!["unit-construct".to_string()]);
    }

    #[test]
    fn test_empty_context_is_rejected_without_creating_session() {
        let factory = MockSessionFactory::new();
        let result = CameraController::new("   ", &factory);
        assert!(matches!(result, Err(CameraError::InitializationError(_))));
        assert!(factory.created_contexts().is_empty());
    }

    #[test]
    fn test_factory_failure_surfaces_as_initialization_error() {
        let factory = MockSessionFactory::new();
        factory.fail_creation(true);
        let result = CameraController::new("unit-fail", &factory);
        assert!(matches!(result, Err(CameraError::InitializationError(_))));
    }

    #[test]
    fn test_null_address_is_rejected_and_released() {
        let factory = MockSessionFactory::new();
        factory.report_null_address(true);
        let result = CameraController::new("unit-null", &factory);
        assert!(matches!(result, Err(CameraError::InitializationError(_))));
        assert_eq!(factory.release_calls(), 1);
    }

    #[test]
    fn test_switch_updates_facing_and_hardware() {
        let factory = MockSessionFactory::new();
        let controller =
            CameraController::with_config("unit-switch", &factory, &back_config()).unwrap();

        assert_eq!(controller.switch_camera().unwrap(), CameraFacing::Front);
        assert_eq!(controller.facing(), CameraFacing::Front);
        assert_eq!(factory.switch_targets(), vec![CameraFacing::Front]);
    }

    #[test]
    fn test_failed_switch_leaves_facing() {
        let factory = MockSessionFactory::new();
        factory.fail_switches(true);
        let controller =
            CameraController::with_config("unit-switch-fail", &factory, &back_config()).unwrap();

        let result = controller.switch_camera();
        assert!(matches!(result, Err(CameraError::SwitchFailed(_))));
        assert_eq!(controller.facing(), CameraFacing::Back);
        assert!(!controller.status().switch_in_flight);
    }

    #[test]
    fn test_switch_timeout_reports_failure_then_lands() {
        let factory = MockSessionFactory::new();
        factory.set_switch_delay(Duration::from_millis(300));
        let mut config = back_config();
        config.switch.timeout_ms = 50;
        let controller = CameraController::with_config("unit-timeout", &factory, &config).unwrap();

        let result = controller.switch_camera();
        assert!(matches!(result, Err(CameraError::SwitchFailed(_))));
        assert_eq!(controller.facing(), CameraFacing::Back);

        let deadline = Instant::now() + Duration::from_secs(5);
        while controller.status().switch_in_flight && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(controller.facing(), CameraFacing::Front);
    }

    #[test]
    fn test_notify_and_sync_never_touch_hardware() {
        let factory = MockSessionFactory::new();
        let controller =
            CameraController::with_config("unit-notify", &factory, &back_config()).unwrap();

        controller.notify_camera_switch();
        assert_eq!(controller.facing(), CameraFacing::Front);
        controller.sync_camera_facing(CameraFacing::Back);
        assert_eq!(controller.facing(), CameraFacing::Back);
        assert_eq!(factory.switch_calls(), 0);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let factory = MockSessionFactory::new();
        let controller = CameraController::new("unit-dispose", &factory).unwrap();
        let handle = controller.native_handle().unwrap();

        controller.dispose();
        controller.dispose();

        assert!(controller.is_disposed());
        assert_eq!(factory.release_calls(), 1);
        assert_eq!(handles::resolve(handle), None);
        assert_eq!(controller.native_handle(), Err(CameraError::UseAfterDispose));
        assert_eq!(controller.switch_camera(), Err(CameraError::UseAfterDispose));
    }

    #[test]
    fn test_drop_releases_session() {
        let factory = MockSessionFactory::new();
        {
            let _controller = CameraController::new("unit-drop", &factory).unwrap();
        }
        assert_eq!(factory.release_calls(), 1);
    }
}
