use std::{
    env,
    time::{Duration, Instant},
};

use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rgbkeypad::{hsv_to_rgb, timing::Timing, Config, Keypad, SimBus, KEYPAD_SIZE};

const DEFAULT_RUN_SECS: u64 = 5;
// Per poll chance that an idle simulated finger presses something
const PRESS_CHANCE: f64 = 0.03;
const SEED: u64 = 0x4b45_5950;

/// A simulated finger: which key is down and for how many more polls.
struct Press {
    index: usize,
    remaining: u32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let run_for = match env::args().nth(1) {
        Some(arg) => Duration::from_secs(
            arg.parse()
                .with_context(|| format!("invalid run time {arg:?}, expected seconds"))?,
        ),
        None => Duration::from_secs(DEFAULT_RUN_SECS),
    };

    let config = Config::new().with_sleep_timeout_secs(2.0)?;
    let mut keypad = Keypad::with_config(SimBus::new(), config);

    for index in 0..KEYPAD_SIZE {
        let color = hsv_to_rgb(index as f32 / KEYPAD_SIZE as f32, 1.0, 1.0);
        keypad.on_press(index, "default", move |key| {
            log::info!("Key {} {:?} pressed", key.index(), key.xy());
            key.toggle_led(Some(color));
        })?;
        keypad.on_hold(index, "default", |key| {
            log::info!("Key {} held", key.index());
            key.set_led(255, 255, 255);
        })?;
        keypad.on_release(index, "default", |key| {
            log::debug!("Key {} released", key.index());
        })?;
    }

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut timing = Timing::default();
    let mut finger: Option<Press> = None;
    let mut led_writes = 0;
    let started = Instant::now();

    while started.elapsed() < run_for {
        if timing.should_poll() {
            finger = match finger.take() {
                Some(press) if press.remaining > 0 => Some(Press {
                    remaining: press.remaining - 1,
                    ..press
                }),
                Some(_) => None,
                None if rng.gen_bool(PRESS_CHANCE) => Some(Press {
                    index: rng.gen_range(0..KEYPAD_SIZE),
                    remaining: rng.gen_range(5..120),
                }),
                None => None,
            };

            match &finger {
                Some(press) => keypad.bus_mut().push_pressed(&[press.index]),
                None => keypad.bus_mut().push_pressed(&[]),
            }

            keypad
                .update(Instant::now())
                .context("keypad update failed")?;
            led_writes += keypad.bus().writes().len();
            keypad.bus_mut().clear_writes();
            timing.mark_poll();
        }

        timing.try_sleep();
    }

    log::info!(
        "Done after {} polls, {} LED writes",
        keypad.bus().reads(),
        led_writes
    );
    Ok(())
}
