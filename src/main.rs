mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use pulse_arena::compute::{
    equip_weapon, init_state, pull_trigger, release_trigger, request_reload, restart,
    select_upgrade, steer, tick,
};
use pulse_arena::config::{Arena, Catalog, ConfigStore, WEAPON_KEYS};
use pulse_arena::entities::{GameState, GameStatus};
use pulse_arena::logging;
use pulse_arena::stats::{default_profile_path, Profile, StatsTracker};

use display::Screen;

/// One simulation tick per frame at the arena's 60 ticks/second.
const FRAME: Duration = Duration::from_millis(16);

/// Crosshair distance from the player centre, in arena units.
const AIM_DISTANCE: f32 = 200.0;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames. Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈130 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

/// Top-down arena survival shooter in the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding enemies.json, weapons.json and powerups.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Profile file for lifetime stats
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Weapon equipped at the start of each run
    #[arg(long, default_value = "rifle")]
    weapon: String,

    /// Include debug messages in the log
    #[arg(short, long)]
    verbose: bool,

    /// Write log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

/// Unit-ish vector from four held directions.
fn direction(up: bool, down: bool, left: bool, right: bool) -> Vec2 {
    let x = f32::from(u8::from(right)) - f32::from(u8::from(left));
    let y = f32::from(u8::from(down)) - f32::from(u8::from(up));
    Vec2::new(x, y)
}

// ── Title screen ──────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    profile: &Profile,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "◆  PULSE  ARENA  ◆";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if profile.games_played > 0 {
        let best = format!(
            "Best Score: {}   Highest Wave: {}",
            profile.best_score, profile.highest_wave
        );
        out.queue(cursor::MoveTo(
            cx.saturating_sub(best.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&best))?;
    }

    let controls: &[(&str, &str)] = &[
        ("W A S D", "Move"),
        ("Arrows ", "Aim"),
        ("SPACE  ", "Fire (hold to charge the railgun)"),
        ("R      ", "Reload"),
        ("1 - 5  ", "Switch weapon / pick upgrade"),
        ("Q      ", "Quit"),
    ];
    for (i, (key, desc)) in controls.iter().enumerate() {
        let row = cy.saturating_sub(3) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(18), row))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(*key))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("  {desc}")))?;
    }

    let hint = "ENTER : Start   Q : Quit";
    out.queue(cursor::MoveTo(cx.saturating_sub(hint.chars().count() as u16 / 2), cy + 5))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print(hint))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // A closed channel means the input thread died; treat it as quit.
    while let Ok(ev) = rx.recv() {
        if let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = ev {
            match code {
                KeyCode::Enter => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
    Ok(MenuResult::Quit)
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Runs until the player quits.
///
/// Input model: a `key_frame` map records the frame of the last press/repeat
/// event for every key. Each frame, keys still within `HOLD_WINDOW` count as
/// held and are turned into intents together, so movement, aiming and the
/// trigger can all be held at once. One-shot keys (reload, weapon, upgrade,
/// restart) act on the press event itself.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    rng: &mut ChaCha8Rng,
    start_weapon: &str,
) -> std::io::Result<()> {
    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut aim_dir = Vec2::X;
    let mut trigger_was_held = false;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code, frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(());
                        }
                        KeyCode::Char('r') | KeyCode::Char('R') => {
                            request_reload(state);
                        }
                        KeyCode::Char(c @ '1'..='5') => {
                            let index = c as usize - '1' as usize;
                            match state.status {
                                GameStatus::Playing => {
                                    equip_weapon(state, WEAPON_KEYS[index]);
                                }
                                GameStatus::Upgrade => {
                                    select_upgrade(state, index);
                                }
                                GameStatus::GameOver => {}
                            }
                        }
                        KeyCode::Enter => {
                            if restart(state) {
                                equip_weapon(state, start_weapon);
                                trigger_was_held = false;
                            }
                        }
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code, frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        // ── Apply held-key intents every frame ────────────────────────────────
        if state.status == GameStatus::Playing {
            let held = |keys: &[KeyCode]| any_held(&key_frame, keys, frame);

            let heading = direction(
                held(&[KeyCode::Char('w'), KeyCode::Char('W')]),
                held(&[KeyCode::Char('s'), KeyCode::Char('S')]),
                held(&[KeyCode::Char('a'), KeyCode::Char('A')]),
                held(&[KeyCode::Char('d'), KeyCode::Char('D')]),
            );
            steer(state, heading);

            let look = direction(
                held(&[KeyCode::Up]),
                held(&[KeyCode::Down]),
                held(&[KeyCode::Left]),
                held(&[KeyCode::Right]),
            );
            if look != Vec2::ZERO {
                aim_dir = look.normalize();
            }
            let aim = state.player.center() + aim_dir * AIM_DISTANCE;

            let trigger = held(&[KeyCode::Char(' ')]);
            if trigger {
                pull_trigger(state, aim, rng);
            } else if trigger_was_held {
                release_trigger(state, aim, rng);
            }
            trigger_was_held = trigger;
        }

        tick(state, rng);

        let aim = state.player.center() + aim_dir * AIM_DISTANCE;
        display::render(out, state, Screen::current()?, aim)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        logging::init(args.verbose, Some(path.as_path()))
            .with_context(|| format!("cannot open log file {}", path.display()))?;
    }

    let catalog = match &args.data_dir {
        Some(dir) => Catalog::load(&ConfigStore::from_dir(dir))?,
        None => Catalog::load(ConfigStore::shared())?,
    };
    if catalog.weapon(&args.weapon).is_none() {
        bail!("unknown weapon `{}`; expected one of {}", args.weapon, WEAPON_KEYS.join(", "));
    }
    let catalog = Arc::new(catalog);

    let stats = StatsTracker::open(args.profile.clone().unwrap_or_else(default_profile_path));
    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut out = BufWriter::new(stdout());
    let session = TerminalSession::enter(&mut out)?;
    let rx = spawn_input_thread();

    run(&mut out, &rx, catalog, stats, &mut rng, &args.weapon)?;
    drop(session);
    Ok(())
}

/// Raw mode plus alternate screen for as long as the value lives.
struct TerminalSession {
    keyboard_enhanced: bool,
}

impl TerminalSession {
    fn enter<W: Write>(out: &mut W) -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        // Key-release events need the kitty keyboard protocol; without it the
        // hold window in `game_loop` stands in for releases.
        let keyboard_enhanced = out
            .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .is_ok();
        Ok(Self { keyboard_enhanced })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.keyboard_enhanced {
            let _ = out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Blocking terminal reads on their own thread, forwarded over a channel.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    catalog: Arc<Catalog>,
    stats: StatsTracker,
    rng: &mut ChaCha8Rng,
    start_weapon: &str,
) -> std::io::Result<()> {
    if let MenuResult::Quit = show_menu(out, rx, &stats.profile)? {
        return Ok(());
    }
    let mut state = init_state(catalog, Arena::default(), stats);
    equip_weapon(&mut state, start_weapon);
    game_loop(out, &mut state, rx, rng, start_weapon)
}
