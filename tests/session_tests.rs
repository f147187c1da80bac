//! Preview Session Tests
//!
//! Tests for:
//! - Blocking and background motion loads
//! - Superseded loads being discarded by generation
//! - Failed loads leaving the active animation untouched
//! - Asset replacement, pending motions and speed carry-over

mod common;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use kinema::animation::{ImportSettings, PlaybackStatus, Warning};
use kinema::assets::loader::import_bytes;
use kinema::{Error, FileAssetReader, LoadError, MotionLoader, PreviewSession};

use common::{MeshStore, PELVIS_BIND, WALK, WAVE, rigged_asset, static_mesh_asset};

const EMPTY: &str = "nodes\n0 pelvis -1\nend\nskeleton\nend\n";
const BROKEN: &str = "nodes\n0 pelvis -1\n";

/// Writes the fixture motions into a directory unique to `test`.
fn fixture_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kinema_{test}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    for (file, text) in [
        ("wave.motion", WAVE),
        ("walk.motion", WALK),
        ("empty.motion", EMPTY),
        ("broken.motion", BROKEN),
    ] {
        std::fs::write(dir.join(file), text).unwrap();
    }
    dir
}

fn session(test: &str) -> PreviewSession {
    let _ = env_logger::builder().is_test(true).try_init();
    let settings = ImportSettings {
        sample_rate: 1.0,
        ..Default::default()
    };
    PreviewSession::new(MotionLoader::new(FileAssetReader::new(fixture_dir(test)), settings))
}

fn rigged_session(test: &str) -> (PreviewSession, common::Rig) {
    let mut store = MeshStore::new();
    let (scene, rig) = rigged_asset(&mut store);
    let mut session = session(test);
    session.set_asset(scene, rig.root);
    (session, rig)
}

/// Pumps `update` until every background load has been delivered.
fn drain(session: &mut PreviewSession) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while session.loads_in_flight() > 0 {
        assert!(Instant::now() < deadline, "background loads did not finish");
        session.update(0.0);
        std::thread::sleep(Duration::from_millis(2));
    }
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn blocking_load_installs_a_stopped_controller() -> anyhow::Result<()> {
    let (mut session, _) = rigged_session("blocking");

    session.load_motion_blocking("wave.motion")?;

    let info = session.animation_info().unwrap();
    assert_eq!(info.name, "wave");
    assert_eq!(info.bone_count, 2);
    assert_eq!(info.frame_count, 2);
    assert_eq!(session.playback_state().unwrap().state, PlaybackStatus::Stopped);
    assert!(session.warnings().is_empty());
    Ok(())
}

#[test]
fn background_load_is_installed_on_update() {
    let (mut session, _) = rigged_session("background");

    session.select_motion("walk.motion");
    assert!(session.animation_info().is_none());
    drain(&mut session);

    let info = session.animation_info().unwrap();
    // No name comment: named after the file
    assert_eq!(info.name, "walk");
    assert_eq!(session.warnings().len(), 3);
}

#[test]
fn superseded_load_is_discarded() {
    let (mut session, _) = rigged_session("supersede");

    let first = session.select_motion("walk.motion");
    let second = session.select_motion("wave.motion");
    assert!(second > first);
    drain(&mut session);

    // Whichever finished first, only the latest request may be installed
    assert_eq!(session.animation_info().unwrap().name, "wave");
    assert_eq!(session.generation(), second);
}

#[test]
fn asset_change_keeps_the_in_flight_selection() {
    let (mut session, _) = rigged_session("asset_change");

    session.select_motion("wave.motion");
    let mut store = MeshStore::new();
    let (scene, rig) = rigged_asset(&mut store);
    session.set_asset(scene, rig.root);
    drain(&mut session);

    assert_eq!(session.animation_info().unwrap().name, "wave");
    let skeleton = session.skeleton().unwrap();
    assert_eq!(skeleton.asset_root, rig.root);
    assert_eq!(skeleton.node_for("pelvis"), Some(rig.pelvis));
}

#[test]
fn asset_change_never_reinstates_an_older_motion() -> anyhow::Result<()> {
    let (mut session, _) = rigged_session("asset_change_older");
    session.load_motion_blocking("wave.motion")?;

    session.select_motion("walk.motion");
    let mut store = MeshStore::new();
    let (scene, rig) = rigged_asset(&mut store);
    session.set_asset(scene, rig.root);

    // Until the selection arrives nothing older stands in for it
    assert!(session.playback_state().is_none());
    drain(&mut session);

    assert_eq!(session.animation_info().unwrap().name, "walk");
    assert_eq!(session.playback_state().unwrap().state, PlaybackStatus::Stopped);
    Ok(())
}

#[test]
fn asset_change_without_selection_reapplies_current_motion() -> anyhow::Result<()> {
    let (mut session, _) = rigged_session("asset_change_current");
    session.load_motion_blocking("wave.motion")?;

    let mut store = MeshStore::new();
    let (scene, rig) = rigged_asset(&mut store);
    session.set_asset(scene, rig.root);

    assert_eq!(session.animation_info().unwrap().name, "wave");
    assert_eq!(session.loads_in_flight(), 0);
    Ok(())
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn failed_load_leaves_playback_untouched() -> anyhow::Result<()> {
    let (mut session, rig) = rigged_session("failure");
    session.load_motion_blocking("wave.motion")?;
    session.play();
    session.update(0.25);

    session.select_motion("missing.motion");
    drain(&mut session);

    assert!(matches!(session.take_load_error(), Some(LoadError::Io(_))));
    assert!(session.take_load_error().is_none());

    let state = session.playback_state().unwrap();
    assert_eq!(state.state, PlaybackStatus::Playing);
    assert!((state.current_time - 0.25).abs() < 1e-5);
    assert_eq!(session.animation_info().unwrap().name, "wave");

    let pelvis = session.scene().get_node(rig.pelvis).unwrap().transform.position;
    assert_ne!(pelvis, PELVIS_BIND);
    Ok(())
}

#[test]
fn malformed_file_is_a_format_error() {
    let (mut session, _) = rigged_session("malformed");

    let err = session.load_motion_blocking("broken.motion").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Import {
            source: Error::Format(_),
            ..
        }
    ));
    assert!(session.playback_state().is_none());
}

#[test]
fn frameless_file_is_an_empty_animation() {
    let (mut session, _) = rigged_session("frameless");

    let err = session.load_motion_blocking("empty.motion").unwrap_err();
    assert!(matches!(
        err,
        LoadError::Import {
            source: Error::EmptyAnimation,
            ..
        }
    ));
}

#[test]
fn non_utf8_bytes_are_rejected() {
    let err = import_bytes("bad.motion", &[0xff, 0xfe, 0x00], &ImportSettings::default()).unwrap_err();
    assert!(matches!(err, LoadError::Utf8 { .. }));
}

// ============================================================================
// Supersede semantics
// ============================================================================

#[test]
fn new_motion_restores_bind_pose_and_keeps_speed() -> anyhow::Result<()> {
    let (mut session, rig) = rigged_session("replace");
    session.load_motion_blocking("wave.motion")?;
    session.set_speed(2.0);
    session.play();
    session.update(0.2);

    session.load_motion_blocking("walk.motion")?;

    let state = session.playback_state().unwrap();
    assert_eq!(state.state, PlaybackStatus::Stopped);
    assert_eq!(state.speed, 2.0);
    assert_eq!(state.current_time, 0.0);

    // Walk binds nothing on this rig, so the pose left behind is the bind pose
    session.play();
    session.update(0.05);
    let pelvis = session.scene().get_node(rig.pelvis).unwrap().transform.position;
    assert_eq!(pelvis, PELVIS_BIND);
    Ok(())
}

#[test]
fn asset_change_keeps_speed() -> anyhow::Result<()> {
    let (mut session, _) = rigged_session("asset_speed");
    session.load_motion_blocking("wave.motion")?;
    session.set_speed(2.0);

    let mut store = MeshStore::new();
    let (scene, rig) = rigged_asset(&mut store);
    session.set_asset(scene, rig.root);

    assert_eq!(session.playback_state().unwrap().speed, 2.0);
    Ok(())
}

#[test]
fn speed_set_before_any_motion_applies_to_it() -> anyhow::Result<()> {
    let (mut session, _) = rigged_session("early_speed");
    session.set_speed(0.5);
    session.set_speed(f32::NAN);

    session.load_motion_blocking("wave.motion")?;

    assert_eq!(session.playback_state().unwrap().speed, 0.5);
    Ok(())
}

#[test]
fn failed_blocking_load_keeps_background_selection() {
    let (mut session, _) = rigged_session("blocking_failure");

    let selected = session.select_motion("walk.motion");
    assert!(session.load_motion_blocking("missing.motion").is_err());
    assert_eq!(session.generation(), selected);
    drain(&mut session);

    assert_eq!(session.animation_info().unwrap().name, "walk");
}

#[test]
fn motion_selected_before_asset_is_applied_later() -> anyhow::Result<()> {
    let mut session = session("pending");
    session.load_motion_blocking("wave.motion")?;
    assert!(session.playback_state().is_none());

    let mut store = MeshStore::new();
    let (scene, rig) = rigged_asset(&mut store);
    session.set_asset(scene, rig.root);

    assert_eq!(session.animation_info().unwrap().name, "wave");
    assert_eq!(session.playback_state().unwrap().state, PlaybackStatus::Stopped);
    Ok(())
}

#[test]
fn switching_to_a_static_mesh_synthesizes_a_skeleton() -> anyhow::Result<()> {
    let (mut session, _) = rigged_session("static");
    session.load_motion_blocking("wave.motion")?;

    let mut store = MeshStore::new();
    let (scene, root, _) = static_mesh_asset(&mut store);
    session.set_asset(scene, root);

    let skeleton = session.skeleton().unwrap();
    assert!(skeleton.synthesized);
    let pelvis = skeleton.node_for("pelvis").unwrap();
    assert!(session.warnings().contains(&Warning::SynthesizedSkeleton { bone_count: 2 }));

    session.set_time(0.5);
    let position = session.scene().get_node(pelvis).unwrap().transform.position;
    assert!((position.z - 0.5).abs() < 1e-5);
    Ok(())
}

#[test]
fn controls_without_a_motion_are_no_ops() {
    let mut session = session("idle");
    session.play();
    session.pause();
    session.stop();
    session.set_speed(2.0);
    session.set_time(1.0);
    assert!(session.update(0.1).is_none());
    assert!(session.playback_state().is_none());
}
