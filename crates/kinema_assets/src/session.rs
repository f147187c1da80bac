//! Preview session.
//!
//! Owns the loaded asset scene, its bound skeleton and at most one active
//! [`AnimationController`]. Motion loads run on the loader runtime and are
//! delivered back through a channel tagged with the generation they were
//! requested in; anything older than the current generation is dropped on
//! arrival, so a slow stale load can never replace a newer selection.

use std::sync::Arc;

use kinema_animation::{
    AnimationController, AnimationInfo, BoundSkeleton, PlaybackState, SkeletonBinder, TickReport, Warning,
};
use kinema_core::LoadError;
use kinema_scene::{NodeHandle, Scene};

use crate::io::{AssetReader, FileAssetReader};
use crate::loader::{LoadedMotion, MotionLoader, get_loader_runtime};

type LoadResult = (u64, Result<LoadedMotion, LoadError>);

pub struct PreviewSession<R: AssetReader + 'static = FileAssetReader> {
    scene: Scene,
    asset_root: Option<NodeHandle>,
    skeleton: Option<BoundSkeleton>,

    controller: Option<AnimationController>,
    current: Option<LoadedMotion>,
    pending: Option<LoadedMotion>,
    warnings: Vec<Warning>,
    last_error: Option<LoadError>,
    speed: f32,

    loader: Arc<MotionLoader<R>>,
    generation: u64,
    /// Uri of the selection the current generation is waiting for
    requested: Option<String>,
    in_flight: usize,
    tx: flume::Sender<LoadResult>,
    rx: flume::Receiver<LoadResult>,
}

impl<R: AssetReader + 'static> PreviewSession<R> {
    pub fn new(loader: MotionLoader<R>) -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            scene: Scene::new(),
            asset_root: None,
            skeleton: None,
            controller: None,
            current: None,
            pending: None,
            warnings: Vec::new(),
            last_error: None,
            speed: 1.0,
            loader: Arc::new(loader),
            generation: 0,
            requested: None,
            in_flight: 0,
            tx,
            rx,
        }
    }

    // ========================================================================
    // Asset & motion selection
    // ========================================================================

    /// Replaces the previewed asset and re-binds on the next motion
    /// install. A selection still loading is requested again for the new
    /// asset; otherwise the installed (or pending) motion is re-applied.
    pub fn set_asset(&mut self, scene: Scene, asset_root: NodeHandle) {
        self.generation += 1;
        self.retire_controller();

        self.scene = scene;
        self.asset_root = Some(asset_root);
        self.skeleton = None;
        self.warnings.clear();

        if let Some(uri) = self.requested.take() {
            // The older motions must not replace the newer selection
            self.pending = None;
            self.current = None;
            self.select_motion(&uri);
            return;
        }

        let motion = self.pending.take().or_else(|| self.current.take());
        if let Some(motion) = motion {
            self.install_motion(motion);
        }
    }

    /// Starts fetching `uri` in the background and returns the generation
    /// the result will be accepted under.
    pub fn select_motion(&mut self, uri: &str) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let uri = uri.to_string();
        self.requested = Some(uri.clone());
        self.in_flight += 1;

        get_loader_runtime().spawn(async move {
            let result = loader.load(&uri).await;
            // The session may be gone; nothing to deliver to then
            let _ = tx.send((generation, result));
        });

        log::debug!("Requested motion generation {generation}");
        generation
    }

    /// Loads `uri` synchronously and installs it on success, superseding
    /// any background selection. A failure leaves both the active
    /// animation and a pending background selection untouched.
    pub fn load_motion_blocking(&mut self, uri: &str) -> Result<(), LoadError> {
        let loaded = self.loader.load_blocking(uri)?;
        self.generation += 1;
        self.requested = None;
        self.install_motion(loaded);
        Ok(())
    }

    /// Installs an already loaded motion: stops and detaches the previous
    /// controller, binds (or re-matches) the skeleton and builds a new
    /// controller in the Stopped state at the session's playback speed.
    pub fn install_motion(&mut self, loaded: LoadedMotion) {
        let Some(asset_root) = self.asset_root else {
            log::warn!("No asset loaded yet; keeping '{}' until one is", loaded.imported.info.name);
            self.pending = Some(loaded);
            return;
        };

        self.retire_controller();

        let bones = &loaded.imported.bones;
        let skeleton = self
            .skeleton
            .get_or_insert_with(|| SkeletonBinder::bind(&mut self.scene, asset_root, bones));

        self.warnings = skeleton
            .warnings
            .iter()
            .filter(|w| !matches!(w, Warning::UnmatchedBone { .. }))
            .cloned()
            .chain(skeleton.match_bones(bones))
            .collect();
        self.asset_root = Some(skeleton.asset_root);

        let mut controller = AnimationController::new(Arc::clone(&loaded.imported.clip), skeleton);
        controller.set_speed(self.speed);

        log::info!(
            "Installed '{}' ({:.2}s, {} warnings)",
            loaded.imported.info.name,
            loaded.imported.info.duration_seconds,
            self.warnings.len()
        );

        self.controller = Some(controller);
        self.current = Some(loaded);
    }

    /// Stops and detaches the active controller so it can never write to
    /// the scene again.
    fn retire_controller(&mut self) {
        if let Some(mut old) = self.controller.take() {
            old.stop(&mut self.scene);
            old.detach();
        }
    }

    // ========================================================================
    // Per-tick update
    // ========================================================================

    /// Host tick: accepts finished loads of the current generation, then
    /// advances playback.
    pub fn update(&mut self, dt: f32) -> Option<TickReport> {
        self.drain_loads();
        let controller = self.controller.as_mut()?;
        controller.tick(dt, &mut self.scene)
    }

    fn drain_loads(&mut self) {
        while let Ok((generation, result)) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);

            if generation != self.generation {
                log::debug!("Discarding stale motion load (generation {generation}, current {})", self.generation);
                continue;
            }
            self.requested = None;
            match result {
                Ok(loaded) => self.install_motion(loaded),
                Err(err) => {
                    log::error!("Motion load failed: {err}");
                    self.last_error = Some(err);
                }
            }
        }
    }

    /// Number of background loads not yet drained by [`update`](Self::update).
    #[must_use]
    pub fn loads_in_flight(&self) -> usize {
        self.in_flight
    }

    // ========================================================================
    // Playback controls
    // ========================================================================

    pub fn play(&mut self) {
        if let Some(controller) = &mut self.controller {
            controller.play();
        }
    }

    pub fn pause(&mut self) {
        if let Some(controller) = &mut self.controller {
            controller.pause();
        }
    }

    pub fn stop(&mut self) {
        if let Some(controller) = &mut self.controller {
            controller.stop(&mut self.scene);
        }
    }

    /// Sets the speed of the active controller and of every controller
    /// installed after it.
    pub fn set_speed(&mut self, speed: f32) {
        if !speed.is_finite() {
            log::warn!("Ignoring non-finite playback speed {speed}");
            return;
        }
        self.speed = speed;
        if let Some(controller) = &mut self.controller {
            controller.set_speed(speed);
        }
    }

    pub fn set_time(&mut self, time: f32) {
        if let Some(controller) = &mut self.controller {
            controller.set_time(time, &mut self.scene);
        }
    }

    // ========================================================================
    // Read-only surface
    // ========================================================================

    #[must_use]
    pub fn playback_state(&self) -> Option<PlaybackState> {
        self.controller.as_ref().map(AnimationController::playback_state)
    }

    #[must_use]
    pub fn animation_info(&self) -> Option<&AnimationInfo> {
        self.current.as_ref().map(|m| &m.imported.info)
    }

    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Takes the most recent load failure, if any.
    pub fn take_load_error(&mut self) -> Option<LoadError> {
        self.last_error.take()
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[must_use]
    pub fn asset_root(&self) -> Option<NodeHandle> {
        self.asset_root
    }

    #[must_use]
    pub fn skeleton(&self) -> Option<&BoundSkeleton> {
        self.skeleton.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
