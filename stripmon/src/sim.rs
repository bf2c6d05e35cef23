use std::f64::consts::TAU;
use std::thread;
use std::time::{Duration, Instant};

use feed::{ChannelEvent, ChannelProperties, FeedPublisher};
use rand::Rng;
use stripmon_core::settings::SimChannel;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);
const DROPOUT_GAP: Duration = Duration::from_millis(1500);

/// Drive the in-process feed with one background thread per simulated
/// channel: connect, announce properties, then stream noisy sine samples
/// with optional disconnect gaps.
pub fn spawn_simulator(channels: Vec<SimChannel>, publisher: FeedPublisher, epoch: Instant) {
    for channel in channels {
        let publisher = publisher.clone();
        thread::spawn(move || run_channel(channel, publisher, epoch));
    }
}

fn run_channel(channel: SimChannel, publisher: FeedPublisher, epoch: Instant) {
    let mut rng = rand::thread_rng();
    let mut connected = false;
    let mut announced = false;
    loop {
        thread::sleep(SAMPLE_INTERVAL);
        if !connected {
            publisher.publish(&channel.name, ChannelEvent::Connected);
            connected = true;
            if !announced {
                publisher.publish(
                    &channel.name,
                    ChannelEvent::Properties(properties_for(&channel)),
                );
                announced = true;
            }
        }
        if channel.dropout > 0.0 && rng.gen::<f64>() < channel.dropout {
            log::debug!("simulated dropout on {}", channel.name);
            publisher.publish(&channel.name, ChannelEvent::Disconnected);
            connected = false;
            thread::sleep(DROPOUT_GAP);
            continue;
        }
        let t = epoch.elapsed().as_secs_f64();
        let wave = channel.offset + channel.amplitude * (TAU * t / channel.period).sin();
        let noise = channel.noise * (rng.gen::<f64>() * 2.0 - 1.0);
        publisher.publish(&channel.name, ChannelEvent::Value { t, y: wave + noise });
    }
}

/// Threshold/display metadata derived from the wave shape, so alarm lines
/// and explicit ranges show up without a real control system behind them.
fn properties_for(channel: &SimChannel) -> ChannelProperties {
    let swing = channel.amplitude.abs() + channel.noise.abs();
    ChannelProperties {
        lower_alarm_limit: channel.offset - 0.95 * swing,
        upper_alarm_limit: channel.offset + 0.95 * swing,
        lower_warning_limit: channel.offset - 0.8 * swing,
        upper_warning_limit: channel.offset + 0.8 * swing,
        lower_display_limit: channel.offset - 1.2 * swing,
        upper_display_limit: channel.offset + 1.2 * swing,
        precision: 2,
        units: channel.units.clone(),
        ..ChannelProperties::default()
    }
}
