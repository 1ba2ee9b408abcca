use super::{BackendKind, FallbackBackend, NativeBackend, PlaybackBackend};
use bridge_traits::{MediaElement, NativeMediaService};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// What happens to the native route after a native dispatch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeRetryPolicy {
    /// Keep offering every play request to the native service first.
    #[default]
    EveryCall,
    /// After one failure, route every later request straight to the fallback.
    DemoteAfterFailure,
}

/// Chooses which backend a play request goes to.
///
/// Native capability is detected once, at construction. A native failure
/// is recorded but never revokes the capability flag.
pub struct BackendSelector {
    native: Option<Arc<dyn PlaybackBackend>>,
    fallback: Arc<dyn PlaybackBackend>,
    policy: NativeRetryPolicy,
    demoted: AtomicBool,
    native_failures: AtomicU32,
}

impl BackendSelector {
    /// Build from already constructed backends. `native` is the native
    /// backend only when it is reachable.
    pub fn new(
        native: Option<Arc<dyn PlaybackBackend>>,
        fallback: Arc<dyn PlaybackBackend>,
        policy: NativeRetryPolicy,
    ) -> Self {
        Self {
            native,
            fallback,
            policy,
            demoted: AtomicBool::new(false),
            native_failures: AtomicU32::new(0),
        }
    }

    /// Detect native capability and wrap both host surfaces.
    pub fn detect(
        native: Option<Arc<dyn NativeMediaService>>,
        element: Arc<dyn MediaElement>,
        policy: NativeRetryPolicy,
    ) -> Self {
        let native = native
            .map(NativeBackend::new)
            .filter(NativeBackend::is_available)
            .map(|backend| Arc::new(backend) as Arc<dyn PlaybackBackend>);

        info!(
            native = native.is_some(),
            ?policy,
            "Playback backend selected: {}",
            if native.is_some() { BackendKind::Native } else { BackendKind::Fallback }
        );

        Self::new(native, Arc::new(FallbackBackend::new(element)), policy)
    }

    /// Capability flag fixed at detection time.
    pub fn native_available(&self) -> bool {
        self.native.is_some()
    }

    /// The backend selected at detection time.
    pub fn active_kind(&self) -> BackendKind {
        if self.native_available() {
            BackendKind::Native
        } else {
            BackendKind::Fallback
        }
    }

    /// Backend the next play request is offered to first.
    pub fn preferred(&self) -> Arc<dyn PlaybackBackend> {
        match &self.native {
            Some(native) if !self.demoted.load(Ordering::SeqCst) => native.clone(),
            _ => self.fallback.clone(),
        }
    }

    pub fn fallback(&self) -> Arc<dyn PlaybackBackend> {
        self.fallback.clone()
    }

    /// Backend for `kind`. Resolves to the fallback when native is absent.
    pub fn backend(&self, kind: BackendKind) -> Arc<dyn PlaybackBackend> {
        match (kind, &self.native) {
            (BackendKind::Native, Some(native)) => native.clone(),
            _ => self.fallback.clone(),
        }
    }

    /// Every distinct backend, native first.
    pub fn backends(&self) -> Vec<Arc<dyn PlaybackBackend>> {
        self.native
            .iter()
            .cloned()
            .chain(std::iter::once(self.fallback.clone()))
            .collect()
    }

    pub fn record_native_failure(&self) {
        let failures = self.native_failures.fetch_add(1, Ordering::SeqCst) + 1;
        if self.policy == NativeRetryPolicy::DemoteAfterFailure
            && !self.demoted.swap(true, Ordering::SeqCst)
        {
            warn!(failures, "Native playback demoted; later requests go to the fallback backend");
        }
    }

    pub fn native_failures(&self) -> u32 {
        self.native_failures.load(Ordering::SeqCst)
    }
}
