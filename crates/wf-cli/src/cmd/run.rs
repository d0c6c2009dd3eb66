//! `wheelforge run`: headless session, stdin as the operator console

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use wf_core::SegmentId;
use wf_game::{
    EventQueue, EventSender, FrameLoop, FrameView, GameController, GameEvent, GameMode, Renderer,
};
use wf_link::{DeviceLink, DeviceState, LinkConfig, MqttLink, OfflineLink};
use wf_wheel::{SegmentTable, TimingProfile};

use super::{load_config, print_summary};

/// Command-line overrides for a session
#[derive(Debug, Default)]
pub struct RunOptions {
    pub config: Option<PathBuf>,
    pub broker: Option<String>,
    pub offline: bool,
    pub seed: Option<u64>,
    pub profile: Option<TimingProfile>,
    pub fps: Option<u32>,
}

pub fn execute(options: RunOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(broker) = &options.broker {
        let (host, port) = LinkConfig::parse_broker(broker)?;
        config.link.host = host;
        config.link.port = port;
    }
    if options.seed.is_some() {
        config.seed = options.seed;
    }
    if let Some(profile) = options.profile {
        config.profile = profile;
        config.timing = None;
    }
    if let Some(fps) = options.fps {
        config.fps = fps;
    }
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("wf-mqtt")
        .enable_all()
        .build()
        .context("Failed to start network runtime")?;

    let link: Box<dyn DeviceLink> = if options.offline {
        log::info!("Offline mode, no broker");
        Box::new(OfflineLink)
    } else {
        Box::new(MqttLink::spawn(config.link.clone(), runtime.handle())?)
    };

    let mut controller = GameController::new(&config, link)?;
    let events = EventQueue::default();
    spawn_console(events.sender());

    println!("🎡 WheelForge ready. Keys: [enter] spin, s stats, t test, p simulate,");
    println!("   n/b next/previous segment, <number> select segment, r reset, q quit\n");

    let mut renderer = LogRenderer::new(Arc::clone(controller.table()));
    FrameLoop::new(config.fps).run(&mut controller, &events, &mut renderer);

    let snapshot = controller.stats().snapshot();
    if controller.table().has_dice() && snapshot.total_spins() > 0 {
        print_summary("Session", &snapshot.summary);
    }
    log::info!("Sync: {:?}", controller.sync_stats());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONSOLE INPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Operator console line → event
pub fn parse_command(line: &str) -> Option<GameEvent> {
    let line = line.trim();
    match line {
        "" | "space" => Some(GameEvent::local_spin()),
        "s" => Some(GameEvent::ToggleStatsView),
        "t" => Some(GameEvent::ToggleTestMode),
        "p" => Some(GameEvent::RunSimulation),
        "n" => Some(GameEvent::SelectNextSegment),
        "b" => Some(GameEvent::SelectPreviousSegment),
        "r" => Some(GameEvent::ResetStatistics),
        "q" | "quit" => Some(GameEvent::Quit),
        other => other.parse::<SegmentId>().ok().map(GameEvent::SelectSegment),
    }
}

fn spawn_console(tx: EventSender) {
    std::thread::Builder::new()
        .name("wf-console".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Some(event) => {
                        tx.send(event);
                    }
                    None => println!("? unknown command '{}'", line.trim()),
                }
            }
            // stdin closed
            tx.send(GameEvent::Quit);
        })
        .map(|_| ())
        .unwrap_or_else(|e| log::warn!("Console input unavailable: {}", e));
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENDERER
// ═══════════════════════════════════════════════════════════════════════════════

/// Prints mode changes, results and device state changes
struct LogRenderer {
    table: Arc<SegmentTable>,
    mode: GameMode,
    device: Option<DeviceState>,
    selection: Option<SegmentId>,
    spins_seen: u64,
}

impl LogRenderer {
    fn new(table: Arc<SegmentTable>) -> Self {
        Self {
            table,
            mode: GameMode::Normal,
            device: None,
            selection: None,
            spins_seen: 0,
        }
    }

    fn label(&self, id: SegmentId) -> &str {
        self.table.get(id).map(|s| s.label.as_str()).unwrap_or("?")
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, view: &FrameView) {
        if view.mode != self.mode {
            println!("▶ {}", view.mode.name());
            if view.mode == GameMode::StatsView {
                print_summary("All-Time Stats", &view.stats.summary);
            }
            self.mode = view.mode;
        }

        if view.test_selection != self.selection {
            if let Some(id) = view.test_selection {
                println!("  test segment {}: {}", id, self.label(id));
            }
            self.selection = view.test_selection;
        }

        if self.device != Some(view.device_state) {
            println!("  button: {}", view.device_state.name());
            self.device = Some(view.device_state);
        }

        if view.stats.total_spins() != self.spins_seen && !view.just_completed {
            // Batch or reset outside a visible spin
            println!("  statistics: {} spins", view.stats.total_spins());
            self.spins_seen = view.stats.total_spins();
        }

        if view.just_completed {
            if let Some(result) = &view.last_result {
                println!(
                    "🎯 {}{} after {:.1}s",
                    self.label(result.segment),
                    if result.forced { " (test)" } else { "" },
                    result.duration_secs()
                );
            }
            self.spins_seen = view.stats.total_spins();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_commands() {
        assert_eq!(parse_command(""), Some(GameEvent::local_spin()));
        assert_eq!(parse_command(" s \n"), Some(GameEvent::ToggleStatsView));
        assert_eq!(parse_command("q"), Some(GameEvent::Quit));
        assert_eq!(parse_command("12"), Some(GameEvent::SelectSegment(SegmentId(12))));
        assert_eq!(parse_command("spin please"), None);
    }
}
