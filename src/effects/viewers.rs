use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wasm_bindgen_futures::spawn_local;
use web_sys::Document;
use yew::prelude::*;

use crate::config::ViewerConfig;
use crate::error::{EffectsError, Installed};

const VIEWER_COUNT_ID: &str = "viewer-count";

/// Random walk over a bounded viewer count.
pub struct ViewerSimulator<R> {
    rng: R,
    current: u32,
    min: u32,
    max: u32,
    min_delay_ms: u32,
    max_delay_ms: u32,
    max_step: u32,
    boundary_jitter: u32,
}

impl<R: Rng> ViewerSimulator<R> {
    pub fn new(config: &ViewerConfig, mut rng: R) -> Self {
        let (min, max) = ordered(config.min_viewers, config.max_viewers);
        let (min_delay_ms, max_delay_ms) = ordered(config.min_delay_ms, config.max_delay_ms);
        let current = rng.gen_range(min..=max);
        Self {
            rng,
            current,
            min,
            max,
            min_delay_ms,
            max_delay_ms,
            max_step: config.max_step.max(1),
            boundary_jitter: config.boundary_jitter,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn next_delay_ms(&mut self) -> u32 {
        self.rng.gen_range(self.min_delay_ms..=self.max_delay_ms)
    }

    /// Moves the count by 1..=max_step in a random direction. Overshooting a bound
    /// lands a little inside it instead of sticking to the edge.
    pub fn step(&mut self) -> u32 {
        let magnitude = i64::from(self.rng.gen_range(1..=self.max_step));
        let direction = if self.rng.gen_bool(0.5) { 1 } else { -1 };
        let (min, max) = (i64::from(self.min), i64::from(self.max));

        let mut next = i64::from(self.current) + direction * magnitude;
        if next < min {
            next = min + i64::from(self.rng.gen_range(0..=self.boundary_jitter));
        }
        if next > max {
            next = max - i64::from(self.rng.gen_range(0..=self.boundary_jitter));
        }

        // Jitter can overshoot the opposite bound when the range is narrow.
        self.current = next.clamp(min, max) as u32;
        self.current
    }
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

pub fn display_text(count: u32, label: &str) -> String {
    format!("{} {}", count, label)
}

/// Handle to the running simulator loop. The loop stops at its next wake-up once the
/// handle is cancelled or dropped.
pub struct ViewerTask {
    cancelled: Rc<Cell<bool>>,
}

impl ViewerTask {
    pub fn spawn<R, F>(mut simulator: ViewerSimulator<R>, mut on_tick: F) -> Self
    where
        R: Rng + 'static,
        F: FnMut(u32) + 'static,
    {
        let cancelled = Rc::new(Cell::new(false));
        let flag = cancelled.clone();
        spawn_local(async move {
            loop {
                TimeoutFuture::new(simulator.next_delay_ms()).await;
                if flag.get() {
                    break;
                }
                on_tick(simulator.step());
            }
        });
        Self { cancelled }
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }
}

impl Drop for ViewerTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Properties, PartialEq)]
pub struct ViewerCounterProps {
    pub config: ViewerConfig,
    pub seed: u64,
}

#[function_component(ViewerCounter)]
pub fn viewer_counter(props: &ViewerCounterProps) -> Html {
    let simulator = use_mut_ref(|| {
        Some(ViewerSimulator::new(
            &props.config,
            StdRng::seed_from_u64(props.seed),
        ))
    });
    let viewers = use_state(|| {
        simulator
            .borrow()
            .as_ref()
            .map(ViewerSimulator::current)
            .unwrap_or(props.config.min_viewers)
    });

    {
        let viewers = viewers.setter();
        let simulator = simulator.clone();
        use_effect_with_deps(
            move |_| {
                let task = simulator.borrow_mut().take().map(|simulator| {
                    ViewerTask::spawn(simulator, move |count| {
                        log::debug!("Viewer count now {}", count);
                        viewers.set(count);
                    })
                });
                move || drop(task)
            },
            (),
        );
    }

    html! {
        <>{ display_text(*viewers, &props.config.label) }</>
    }
}

pub fn install(document: &Document, config: &ViewerConfig) -> Result<Installed, EffectsError> {
    let Some(host) = document.get_element_by_id(VIEWER_COUNT_ID) else {
        return Ok(Installed::Skipped);
    };

    let seed = config.seed.unwrap_or_else(rand::random);
    yew::Renderer::<ViewerCounter>::with_root_and_props(
        host,
        ViewerCounterProps {
            config: config.clone(),
            seed,
        },
    )
    .render();

    log::info!(
        "Viewer counter running within [{}, {}]",
        config.min_viewers,
        config.max_viewers
    );
    Ok(Installed::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator(config: &ViewerConfig, seed: u64) -> ViewerSimulator<StdRng> {
        ViewerSimulator::new(config, StdRng::seed_from_u64(seed))
    }

    #[test]
    fn count_stays_within_bounds_for_every_seed() {
        let config = ViewerConfig::default();
        for seed in 0..200 {
            let mut sim = simulator(&config, seed);
            assert!((572..=603).contains(&sim.current()));
            for _ in 0..500 {
                let value = sim.step();
                assert!(
                    (config.min_viewers..=config.max_viewers).contains(&value),
                    "seed {} produced {}",
                    seed,
                    value
                );
            }
        }
    }

    #[test]
    fn steps_move_by_at_most_max_step_inside_the_range() {
        let config = ViewerConfig {
            min_viewers: 0,
            max_viewers: 1_000_000,
            ..ViewerConfig::default()
        };
        let mut sim = simulator(&config, 42);
        sim.current = 500_000;
        for _ in 0..1_000 {
            let before = sim.current();
            let after = sim.step();
            let moved = (i64::from(after) - i64::from(before)).abs();
            assert!((1..=3).contains(&moved), "moved {}", moved);
        }
    }

    #[test]
    fn overshooting_the_floor_lands_near_it() {
        let config = ViewerConfig {
            min_viewers: 100,
            max_viewers: 200,
            ..ViewerConfig::default()
        };
        for seed in 0..100 {
            let mut sim = simulator(&config, seed);
            sim.current = 100;
            let value = sim.step();
            assert!((100..=103).contains(&value), "seed {} produced {}", seed, value);
        }
    }

    #[test]
    fn degenerate_range_holds_its_single_value() {
        let config = ViewerConfig {
            min_viewers: 50,
            max_viewers: 50,
            ..ViewerConfig::default()
        };
        let mut sim = simulator(&config, 3);
        assert_eq!(sim.current(), 50);
        for _ in 0..100 {
            assert_eq!(sim.step(), 50);
        }
    }

    #[test]
    fn delays_fall_in_the_configured_window() {
        let config = ViewerConfig::default();
        let mut sim = simulator(&config, 9);
        for _ in 0..1_000 {
            let delay = sim.next_delay_ms();
            assert!((6_000..=12_000).contains(&delay));
        }
    }

    #[test]
    fn same_seed_replays_the_same_walk() {
        let config = ViewerConfig::default();
        let mut a = simulator(&config, 1234);
        let mut b = simulator(&config, 1234);
        assert_eq!(a.current(), b.current());
        for _ in 0..50 {
            assert_eq!(a.next_delay_ms(), b.next_delay_ms());
            assert_eq!(a.step(), b.step());
        }
    }

    #[test]
    fn display_text_appends_label() {
        assert_eq!(
            display_text(590, &ViewerConfig::default().label),
            "590 viewers currently inside this private presentation"
        );
    }
}
