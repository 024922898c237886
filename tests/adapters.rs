#![cfg(feature = "sim")]

//! Control-adapter binding: visibility partition, capability sinks and
//! adapter-originated actions.

mod common;

use common::{drain, secs, Rig, SRC};
use rfplayer::controls::RecordingControl;
use rfplayer::{
    Categories, ControlAdapter, PlaybackStatus, PlaybackTimes, PlayerConfig, PlayerEventKind,
};
use serde_json::json;

use PlaybackStatus::*;

fn autoplay() -> PlayerConfig {
    PlayerConfig {
        autoplay: true,
        ..Default::default()
    }
}

#[test]
fn visibility_follows_category_masks() {
    let mut rig = Rig::new(PlayerConfig::default());
    let play_button = RecordingControl::new(Categories::READY | Categories::PAUSE);
    let pause_button = RecordingControl::new(Categories::PLAYING);
    let spinner = RecordingControl::new([Prepare, Seeking, Stalled].into_iter().collect());
    let replay = RecordingControl::new(Categories::FINISHED);
    for (name, control) in [
        ("play", &play_button),
        ("pause", &pause_button),
        ("spinner", &spinner),
        ("replay", &replay),
    ] {
        rig.controller
            .register(ControlAdapter::new(name, control.clone()));
    }

    // registered in `prepare`
    assert!(spinner.is_visible());
    assert!(!play_button.is_visible());

    rig.load();
    assert!(play_button.is_visible());
    assert!(!spinner.is_visible());

    rig.controller.play();
    rig.pump();
    assert!(pause_button.is_visible());
    assert!(!play_button.is_visible());

    rig.run_to_end();
    assert!(replay.is_visible());
    for other in [&play_button, &pause_button, &spinner] {
        assert!(!other.is_visible());
    }
}

#[test]
fn late_registration_gets_current_state() {
    let mut rig = Rig::new(PlayerConfig {
        autoplay: true,
        muted: true,
        skip_after_secs: Some(2.0),
        ..Default::default()
    });
    rig.load();
    rig.ticks(4);

    let bar = RecordingControl::new(Categories::PLAYING)
        .with_time_display()
        .with_scrub()
        .with_mute()
        .with_skip();
    rig.controller.register(ControlAdapter::new("bar", bar.clone()));

    let log = bar.log();
    assert_eq!(log.visible, Some(true));
    assert_eq!(log.muted, vec![true]);
    assert_eq!(log.skip_visible, vec![true]);
    assert_eq!(log.times, vec![PlaybackTimes::new(secs(4), secs(30))]);
    assert_eq!(log.positions.len(), 1);
    assert_eq!(rig.controller.adapter_count(), 1);
}

#[test]
fn time_display_tracks_playback() {
    let mut rig = Rig::new(autoplay());
    let labels = RecordingControl::new(Categories::all()).with_time_display();
    rig.controller
        .register(ControlAdapter::new("labels", labels.clone()));
    rig.load();
    rig.ticks(3);

    let times = labels.log().times;
    // readiness shows the total with nothing elapsed
    assert_eq!(times[0], PlaybackTimes::new(secs(0), secs(30)));
    let last = times.last().copied().unwrap();
    assert_eq!(last.current, secs(3));
    assert_eq!(last.remaining, secs(27));
}

#[test]
fn seek_position_stream_is_quiet_while_seeking() {
    let mut rig = Rig::with_sim(
        autoplay(),
        rfplayer::sim::SimConfig {
            auto_complete_seeks: false,
            ..Default::default()
        },
    );
    let mut positions = rig.controller.subscribe_seek_position();
    rig.load();
    rig.ticks(3);
    assert_eq!(drain(&mut positions).len(), 3);

    rig.controller.seek_fraction(0.5);
    rig.remote.emit_time(secs(10));
    rig.pump();
    assert!(drain(&mut positions).is_empty());

    rig.remote.complete_seek(true);
    rig.pump();
    rig.tick();
    let after = drain(&mut positions);
    assert_eq!(after.len(), 1);
    assert!((after[0] - 16.0 / 30.0).abs() < 1e-9);
}

#[test]
fn scrub_drag_previews_and_release_seeks() {
    let mut rig = Rig::new(autoplay());
    let bar = RecordingControl::new(Categories::PLAYING | Categories::SEEKING)
        .with_time_display()
        .with_scrub()
        .with_link();
    let other = RecordingControl::new(Categories::all()).with_time_display();
    rig.controller.register(ControlAdapter::new("bar", bar.clone()));
    rig.controller
        .register(ControlAdapter::new("other", other.clone()));
    rig.load();
    rig.ticks(2);
    bar.clear();
    other.clear();

    let link = bar.link().expect("link injected");
    bar.set_dragging(true);
    link.scrub_changed(0.5);
    rig.pump();
    rig.tick();
    let log = bar.log();
    assert_eq!(log.times, vec![PlaybackTimes::new(secs(15), secs(30))]);
    assert!(log.positions.is_empty());
    // previews go to the dragging adapter only
    assert_eq!(other.log().times.len(), 1);

    bar.set_dragging(false);
    link.scrub_released(0.5);
    rig.pump();
    assert_eq!(rig.status(), Playing);
    assert_eq!(rig.remote.position(), secs(15));
    assert!(rig.statuses().ends_with(&[Seeking, Playing]));
}

#[test]
fn linked_adapter_drives_playback() {
    let mut rig = Rig::new(PlayerConfig::default());
    let remote_control = RecordingControl::new(Categories::all()).with_link();
    rig.controller
        .register(ControlAdapter::new("remote", remote_control.clone()));
    let link = remote_control.link().unwrap();
    rig.load();

    link.play();
    rig.pump();
    assert_eq!(rig.status(), Playing);
    rig.ticks(5);
    link.forward();
    rig.pump();
    assert_eq!(rig.remote.position(), secs(15));
    link.rewind();
    rig.pump();
    assert_eq!(rig.remote.position(), secs(5));
    link.pause();
    rig.pump();
    assert_eq!(rig.status(), Pause);
    link.skip();
    rig.pump();
    assert_eq!(rig.status(), Playing);
    rig.tick();
    assert_eq!(rig.status(), Finished);
}

#[test]
fn mute_toggle_round_trips_through_the_engine() {
    let mut rig = Rig::new(PlayerConfig::default());
    rig.load();
    let toggle = RecordingControl::new(Categories::all())
        .with_mute()
        .with_link();
    rig.controller
        .register(ControlAdapter::new("mute", toggle.clone()));
    let link = toggle.link().unwrap();

    link.toggle_mute();
    rig.pump();
    assert!(rig.remote.is_muted());
    link.toggle_mute();
    rig.pump();
    assert!(!rig.remote.is_muted());
    assert_eq!(toggle.log().muted, vec![false, true, false]);
}

#[test]
fn skip_control_appears_after_the_gate_and_hides_at_finish() {
    let mut rig = Rig::new(PlayerConfig {
        autoplay: true,
        skip_after_secs: Some(3.0),
        ..Default::default()
    });
    let skip = RecordingControl::new(Categories::all()).with_skip();
    rig.controller.register(ControlAdapter::new("skip", skip.clone()));
    rig.load();
    rig.ticks(3);
    assert_eq!(skip.log().skip_visible, vec![false]);
    rig.tick();
    assert_eq!(skip.log().skip_visible, vec![false, true]);
    rig.run_to_end();
    assert_eq!(skip.log().skip_visible, vec![false, true, false]);
}

#[test]
fn skip_visibility_resets_with_a_new_source() {
    let mut rig = Rig::new(PlayerConfig {
        autoplay: true,
        skip_after_secs: Some(1.0),
        ..Default::default()
    });
    let skip = RecordingControl::new(Categories::all()).with_skip();
    rig.controller.register(ControlAdapter::new("skip", skip.clone()));
    rig.load();
    rig.ticks(3);
    rig.controller.set_source(common::OTHER_SRC).unwrap();
    rig.pump();
    assert_eq!(skip.log().skip_visible, vec![false, true, false]);
    assert!(!rig.controller.skip_allowed());
}

#[test]
fn taps_are_relayed_with_their_context() {
    let mut rig = Rig::new(PlayerConfig::default());
    let mut events = rig.controller.subscribe_events();
    let card = RecordingControl::new(Categories::FINISHED).with_link();
    let id = rig.controller.register(ControlAdapter::new("card", card.clone()));
    rig.controller.set_source(SRC).unwrap();

    let link = card.link().unwrap();
    link.content_tapped(Some(json!({ "cta": "learn-more" })));
    link.close(None);
    rig.pump();

    let events = drain(&mut events);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, PlayerEventKind::ContentTapped);
    assert_eq!(events[0].adapter, id);
    assert_eq!(events[0].context, Some(json!({ "cta": "learn-more" })));
    assert_eq!(events[1].kind, PlayerEventKind::Closed);
    assert_eq!(events[1].context, None);
}

#[test]
fn unregistered_adapters_are_cut_off() {
    let mut rig = Rig::new(PlayerConfig::default());
    let control = RecordingControl::new(Categories::all()).with_link();
    let id = rig
        .controller
        .register(ControlAdapter::new("gone", control.clone()));
    let link = control.link().unwrap();
    rig.load();

    assert!(rig.controller.unregister(id));
    assert!(!rig.controller.unregister(id));
    control.clear();

    link.play();
    rig.pump();
    assert_eq!(rig.status(), Ready);
    rig.controller.play();
    rig.pump();
    assert!(control.log().visibility.is_empty());
}

#[test]
fn non_finite_scrub_preview_is_ignored() {
    let mut rig = Rig::new(autoplay());
    let bar = RecordingControl::new(Categories::all())
        .with_time_display()
        .with_scrub()
        .with_link();
    rig.controller.register(ControlAdapter::new("bar", bar.clone()));
    rig.load();
    rig.ticks(2);
    bar.clear();

    let link = bar.link().unwrap();
    bar.set_dragging(true);
    for fraction in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        link.scrub_changed(fraction);
    }
    rig.pump();
    assert!(bar.log().times.is_empty());
    assert_eq!(rig.status(), Playing);

    // the loop keeps serving the adapter afterwards
    link.scrub_changed(0.5);
    rig.pump();
    assert_eq!(bar.log().times, vec![PlaybackTimes::new(secs(15), secs(30))]);
}
