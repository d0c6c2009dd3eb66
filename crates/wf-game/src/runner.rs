//! Frame loop
//!
//! Single-threaded: drain input, tick the controller with the measured
//! delta, hand the frame to the renderer, then sleep off the rest of the
//! frame budget.

use std::time::{Duration, Instant};

use crate::controller::{FrameView, GameController};
use crate::event::EventQueue;

/// Receives one view per frame
pub trait Renderer {
    fn render(&mut self, view: &FrameView);
}

/// Draws nothing
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _view: &FrameView) {}
}

/// Fixed-rate frame pacer
#[derive(Debug, Clone)]
pub struct FrameLoop {
    target_fps: u32,
    frame_budget: Duration,
    frames: u64,
}

impl FrameLoop {
    pub fn new(target_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        Self {
            target_fps,
            frame_budget: Duration::from_secs_f64(1.0 / target_fps as f64),
            frames: 0,
        }
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Frames run so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// One frame with an explicit delta
    pub fn step(
        &mut self,
        controller: &mut GameController,
        events: &EventQueue,
        renderer: &mut dyn Renderer,
        dt: f64,
    ) {
        for event in events.drain() {
            controller.handle_event(event);
        }
        controller.tick(dt);
        renderer.render(&controller.view());
        self.frames += 1;
    }

    /// Run until the controller asks to quit
    pub fn run(
        &mut self,
        controller: &mut GameController,
        events: &EventQueue,
        renderer: &mut dyn Renderer,
    ) {
        log::info!("[Game] Frame loop started at {} fps", self.target_fps);
        let mut last = Instant::now();

        while !controller.should_quit() {
            let frame_start = Instant::now();
            let dt = frame_start.duration_since(last).as_secs_f64();
            last = frame_start;

            self.step(controller, events, renderer, dt);

            let spent = frame_start.elapsed();
            if spent < self.frame_budget {
                std::thread::sleep(self.frame_budget - spent);
            }
        }

        log::info!("[Game] Frame loop stopped after {} frames", self.frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::event::GameEvent;
    use wf_link::OfflineLink;
    use wf_wheel::SpinTiming;

    struct Counting {
        frames: usize,
        completions: usize,
    }

    impl Renderer for Counting {
        fn render(&mut self, view: &FrameView) {
            self.frames += 1;
            if view.just_completed {
                self.completions += 1;
            }
        }
    }

    fn controller() -> GameController {
        let config = GameConfig {
            timing: Some(SpinTiming::studio()),
            seed: Some(3),
            ..GameConfig::default()
        };
        GameController::new(&config, Box::new(OfflineLink)).unwrap()
    }

    #[test]
    fn test_step_drains_events_and_renders() {
        let mut ctl = controller();
        let events = EventQueue::default();
        let mut renderer = Counting {
            frames: 0,
            completions: 0,
        };
        let mut frame_loop = FrameLoop::new(120);

        events.sender().send(GameEvent::local_spin());
        for _ in 0..1000 {
            frame_loop.step(&mut ctl, &events, &mut renderer, 1.0 / 120.0);
        }

        assert_eq!(renderer.frames, 1000);
        assert_eq!(renderer.completions, 1);
        assert_eq!(frame_loop.frames(), 1000);
        assert_eq!(ctl.stats().snapshot().total_spins(), 1);
    }

    #[test]
    fn test_run_exits_on_quit() {
        let mut ctl = controller();
        let events = EventQueue::default();
        events.sender().send(GameEvent::Quit);
        let mut frame_loop = FrameLoop::new(1000);
        frame_loop.run(&mut ctl, &events, &mut NullRenderer);
        assert_eq!(frame_loop.frames(), 1);
    }
}
