use std::sync::{Arc, Mutex as StdMutex};

use crate::lifecycle::sync_hook;
use crate::service::ServiceDescriptor;

/// Shared recorder collecting "phase:service" strings across hooks.
pub type Recorder = Arc<StdMutex<Vec<String>>>;

pub fn new_recorder() -> Recorder {
    Arc::new(StdMutex::new(Vec::new()))
}

/// Build a descriptor whose hooks append "phase:service" to the recorder.
pub fn traced_service(id: &str, phases: &[&str], recorder: &Recorder) -> ServiceDescriptor {
    let mut descriptor = ServiceDescriptor::new(id);
    for &phase in phases {
        let recorder = Arc::clone(recorder);
        descriptor = descriptor.with_hook(
            phase,
            sync_hook(move |ctx| {
                recorder.lock().unwrap().push(format!(
                    "{}:{}",
                    ctx.phase().unwrap_or("?"),
                    ctx.service().unwrap_or("?")
                ));
                Ok(())
            }),
        );
    }
    descriptor
}
