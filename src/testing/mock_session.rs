use crate::errors::CameraError;
use crate::session::{CaptureSession, SessionFactory};
use crate::types::CameraFacing;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

const BASE_ADDRESS: usize = 0x7f00_0000;

#[derive(Default)]
struct Recorder {
    created: Mutex<Vec<String>>,
    switch_targets: Mutex<Vec<CameraFacing>>,
    releases: AtomicUsize,
    active_switches: AtomicUsize,
    released_during_switch: AtomicBool,
    fail_creation: AtomicBool,
    fail_switches: AtomicBool,
    null_address: AtomicBool,
    switch_delay_ms: AtomicU64,
    create_delay_ms: AtomicU64,
}

/// Factory producing [`MockSession`]s that all report into one recorder.
///
/// Clones share the recorder, so a test can keep one clone for assertions
/// and hand another to the code under test.
#[derive(Clone, Default)]
pub struct MockSessionFactory {
    recorder: Arc<Recorder>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creation(&self, fail: bool) {
        self.recorder.fail_creation.store(fail, Ordering::SeqCst);
    }

    pub fn fail_switches(&self, fail: bool) {
        self.recorder.fail_switches.store(fail, Ordering::SeqCst);
    }

    /// Make created sessions report a zero native address
    pub fn report_null_address(&self, null: bool) {
        self.recorder.null_address.store(null, Ordering::SeqCst);
    }

    /// Make every native switch block for `delay`
    pub fn set_switch_delay(&self, delay: Duration) {
        self.recorder
            .switch_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Make every session creation block for `delay` after it is recorded
    pub fn set_create_delay(&self, delay: Duration) {
        self.recorder
            .create_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn created_contexts(&self) -> Vec<String> {
        self.recorder
            .created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Targets of every native switch attempt, successful or not
    pub fn switch_targets(&self) -> Vec<CameraFacing> {
        self.recorder
            .switch_targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn switch_calls(&self) -> usize {
        self.switch_targets().len()
    }

    pub fn release_calls(&self) -> usize {
        self.recorder.releases.load(Ordering::SeqCst)
    }

    /// True if any session was released while a switch was running on it
    pub fn released_during_switch(&self) -> bool {
        self.recorder.released_during_switch.load(Ordering::SeqCst)
    }
}

impl SessionFactory for MockSessionFactory {
    fn create(&self, identifying_context: &str) -> Result<Box<dyn CaptureSession>, CameraError> {
        if self.recorder.fail_creation.load(Ordering::SeqCst) {
            return Err(CameraError::InitializationError(format!(
                "mock camera unavailable for '{}'",
                identifying_context
            )));
        }

        let index = {
            let mut created = self
                .recorder
                .created
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            created.push(identifying_context.to_string());
            created.len()
        };

        let delay = self.recorder.create_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }

        let address = if self.recorder.null_address.load(Ordering::SeqCst) {
            0
        } else {
            BASE_ADDRESS + index * 0x1000
        };

        Ok(Box::new(MockSession {
            address,
            recorder: Arc::clone(&self.recorder),
            released: false,
        }))
    }
}

/// In-memory stand-in for a native capture session
pub struct MockSession {
    address: usize,
    recorder: Arc<Recorder>,
    released: bool,
}

impl CaptureSession for MockSession {
    fn native_address(&self) -> usize {
        self.address
    }

    fn switch_camera(&mut self, target: CameraFacing) -> Result<(), CameraError> {
        self.recorder.active_switches.fetch_add(1, Ordering::SeqCst);
        self.recorder
            .switch_targets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target);

        let delay = self.recorder.switch_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }

        let result = if self.recorder.fail_switches.load(Ordering::SeqCst) {
            Err(CameraError::SwitchFailed(format!(
                "mock hardware refused switch to {}",
                target
            )))
        } else {
            Ok(())
        };

        self.recorder.active_switches.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn release(&mut self) -> Result<(), CameraError> {
        if self.released {
            return Err(CameraError::ReleaseError("mock session already released".to_string()));
        }
        if self.recorder.active_switches.load(Ordering::SeqCst) > 0 {
            self.recorder
                .released_during_switch
                .store(true, Ordering::SeqCst);
        }
        self.released = true;
        self.recorder.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
