//! Scripted session against the simulated engine, driven synchronously.
//!
//! Run with: cargo run --example scripted_session

use rfplayer::controls::RecordingControl;
use rfplayer::sim::SimConfig;
use rfplayer::{Categories, ControlAdapter, Notification, PlayerConfig};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    println!("RFox Player - scripted session\n");

    let config = PlayerConfig {
        autoplay: true,
        start_offset: 0.1,
        skip_after_secs: Some(5.0),
        ..Default::default()
    };
    let (mut controller, remote, clock) = rfplayer::new_player(config, SimConfig::default())?;
    let mut status = controller.subscribe_status();
    let mut progress = controller.subscribe_progress();

    // A control bar shown while playing or paused, with a link back to the player
    let bar = RecordingControl::new(Categories::PLAYING | Categories::PAUSE)
        .with_time_display()
        .with_scrub()
        .with_skip()
        .with_link();
    controller.register(ControlAdapter::new("control-bar", bar.clone()));

    controller.set_source("https://media.example/trailer.m3u8")?;
    controller.pump();

    for second in 0..10 {
        remote.tick();
        clock.advance(Duration::from_secs(1));
        controller.pump();
        if second == 6 {
            println!("-- app goes to background and back");
            controller.notify(Notification::EnteredBackground);
            controller.notify(Notification::EnteredForeground);
            controller.pump();
        }
    }

    if let Some(link) = bar.link() {
        println!("-- user taps skip");
        link.skip();
    }
    controller.pump();
    while remote.tick() {
        controller.pump();
    }
    controller.pump();

    while let Ok(s) = status.try_recv() {
        println!("status:   {}", s);
    }
    while let Ok(p) = progress.try_recv() {
        println!("progress: {:?}", p);
    }

    let log = bar.log();
    println!(
        "\ncontrol bar: visible={:?} skip shown={:?} last times={:?}",
        log.visible,
        log.skip_visible,
        log.times.last()
    );
    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    Ok(())
}
