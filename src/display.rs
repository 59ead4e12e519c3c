//! Rendering layer: all terminal output lives here.
//!
//! Each function receives a writer and a read-only view of the game state.
//! Arena coordinates are scaled onto the terminal grid inside the border;
//! nothing here feeds back into the simulation.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use glam::Vec2;
use pulse_arena::config::Catalog;
use pulse_arena::enemy::{Enemy, EnemyKind};
use pulse_arena::entities::{GameState, GameStatus};
use pulse_arena::stats::Profile;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_WEAPON: Color = Color::White;
const C_HUD_COMBO: Color = Color::Magenta;
const C_PLAYER: Color = Color::White;
const C_SHIELD: Color = Color::Cyan;
const C_PROJECTILE: Color = Color::Magenta;
const C_CROSSHAIR: Color = Color::Rgb { r: 255, g: 70, b: 100 };
const C_CRIT: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

fn rgb(c: [u8; 3]) -> Color {
    Color::Rgb { r: c[0], g: c[1], b: c[2] }
}

/// Terminal grid the arena is projected onto.
#[derive(Clone, Copy, Debug)]
pub struct Screen {
    pub width: u16,
    pub height: u16,
}

impl Screen {
    pub fn current() -> std::io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self { width, height })
    }

    /// Cell for arena point `p`, or `None` when it falls outside the border.
    fn cell(&self, state: &GameState, p: Vec2, shake: i32) -> Option<(u16, u16)> {
        let inner_w = f32::from(self.width.saturating_sub(2));
        let inner_h = f32::from(self.height.saturating_sub(4));
        let col = 1.0 + (p.x / state.arena.width * inner_w).floor() + shake as f32;
        let row = 2.0 + (p.y / state.arena.height * inner_h).floor();
        let in_cols = col >= 1.0 && col < 1.0 + inner_w;
        let in_rows = row >= 2.0 && row < 2.0 + inner_h;
        (in_cols && in_rows).then(|| (col as u16, row as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame with the crosshair at arena point `aim`.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    aim: Vec2,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let shake = if state.effects.screen_shake > 0 { (state.frame % 2) as i32 } else { 0 };

    draw_border(out, screen)?;
    draw_hud(out, state, screen)?;

    for particle in &state.effects.particles {
        if let Some((c, r)) = screen.cell(state, particle.pos, shake) {
            out.queue(cursor::MoveTo(c, r))?;
            out.queue(style::SetForegroundColor(rgb(particle.color)))?;
            out.queue(Print("·"))?;
        }
    }
    for powerup in &state.powerups {
        if let Some((c, r)) = screen.cell(state, powerup.pos, shake) {
            let def = state.catalog.powerup(powerup.kind);
            out.queue(cursor::MoveTo(c, r))?;
            out.queue(style::SetForegroundColor(rgb(def.color)))?;
            out.queue(Print(&def.symbol))?;
        }
    }
    for enemy in &state.enemies {
        draw_enemy(out, state, screen, enemy, shake)?;
    }
    for projectile in &state.projectiles {
        if let Some((c, r)) = screen.cell(state, projectile.pos, shake) {
            out.queue(cursor::MoveTo(c, r))?;
            out.queue(style::SetForegroundColor(C_PROJECTILE))?;
            out.queue(Print("•"))?;
        }
    }

    draw_player(out, state, screen, shake)?;
    draw_damage_numbers(out, state, screen, shake)?;
    draw_crosshair(out, state, screen, aim)?;
    draw_controls_hint(out, state, screen)?;

    match state.status {
        GameStatus::Playing => {}
        GameStatus::Upgrade => draw_upgrade_menu(out, state, screen)?,
        GameStatus::GameOver => draw_game_over(out, state, screen)?,
    }

    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, screen.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, screen: Screen) -> std::io::Result<()> {
    let w = screen.width as usize;
    let h = screen.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(screen.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>7}  Wave:{:>2}  Kills:{:>4}",
        state.tally.score, state.waves.wave, state.tally.kills
    )))?;

    let weapons = &state.weapons;
    let ammo = if weapons.is_reloading() {
        "RELOADING".to_string()
    } else {
        format!("{:>2}/{:<2}", weapons.ammo, weapons.equipped.max_ammo)
    };
    let charge = if weapons.equipped.charge_frames > 0 {
        let filled = (weapons.charge_pct() * 10.0).round() as usize;
        format!(" [{}{}]", "█".repeat(filled), "░".repeat(10 - filled.min(10)))
    } else {
        String::new()
    };
    let weapon_str = format!("{} {}{}", weapons.equipped.name, ammo, charge);
    let wx = (screen.width / 2).saturating_sub(weapon_str.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(wx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_WEAPON))?;
    out.queue(Print(&weapon_str))?;

    let combo = &state.combat;
    let combo_str = if combo.combo > 1 { format!("x{} COMBO  ", combo.combo) } else { String::new() };
    let health_str = format!("HP {:>3}/{:<3}", state.player.health, state.player.max_health);
    let right_len = (combo_str.chars().count() + health_str.chars().count()) as u16;
    out.queue(cursor::MoveTo(screen.width.saturating_sub(right_len + 1), 0))?;
    if !combo_str.is_empty() {
        out.queue(style::SetForegroundColor(C_HUD_COMBO))?;
        out.queue(Print(&combo_str))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&health_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn enemy_glyph(enemy: &Enemy) -> &'static str {
    if enemy.is_boss {
        return "◆";
    }
    match enemy.kind {
        EnemyKind::Rusher => "▶",
        EnemyKind::Tank => "■",
        EnemyKind::Shooter => "◎",
        EnemyKind::Swarm => "∙",
        EnemyKind::Hunter => "▲",
        EnemyKind::Sniper => "✛",
        EnemyKind::Support => "✚",
    }
}

fn draw_enemy<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    enemy: &Enemy,
    shake: i32,
) -> std::io::Result<()> {
    let Some((c, r)) = screen.cell(state, enemy.center(), shake) else {
        return Ok(());
    };
    let color = if enemy.hit_flash > 0 { Color::White } else { rgb(enemy.color) };
    out.queue(cursor::MoveTo(c, r))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(enemy_glyph(enemy)))?;

    // Sniper lock-on indicator
    let aim = enemy.behavior.aim_progress();
    if aim > 0.0 {
        out.queue(cursor::MoveTo(c + 1, r))?;
        out.queue(style::SetForegroundColor(Color::Red))?;
        out.queue(Print(if aim > 0.66 { "!!" } else { "!" }))?;
    }
    Ok(())
}

fn draw_player<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    shake: i32,
) -> std::io::Result<()> {
    let p = &state.player;
    let Some((c, r)) = screen.cell(state, p.center(), shake) else {
        return Ok(());
    };
    // Blink while invulnerable
    if p.is_invulnerable() && state.frame % 4 < 2 {
        return Ok(());
    }
    let color = if p.shield_active { C_SHIELD } else { C_PLAYER };
    out.queue(cursor::MoveTo(c, r))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print("@"))?;

    if p.damage_indicator_timer > 0 {
        if let Some(dir) = p.damage_direction {
            let arrow = if dir.x.abs() > dir.y.abs() {
                if dir.x > 0.0 { "→" } else { "←" }
            } else if dir.y > 0.0 {
                "↓"
            } else {
                "↑"
            };
            out.queue(cursor::MoveTo(c.saturating_sub(1), r))?;
            out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
            out.queue(Print(arrow))?;
        }
    }
    Ok(())
}

fn draw_damage_numbers<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    shake: i32,
) -> std::io::Result<()> {
    for dn in &state.effects.damage_numbers {
        if let Some((c, r)) = screen.cell(state, dn.pos, shake) {
            out.queue(cursor::MoveTo(c, r))?;
            if dn.critical {
                out.queue(style::SetForegroundColor(C_CRIT))?;
                out.queue(Print(format!("{}!", dn.damage)))?;
            } else {
                out.queue(style::SetForegroundColor(Color::White))?;
                out.queue(Print(dn.damage.to_string()))?;
            }
        }
    }
    Ok(())
}

fn draw_crosshair<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    aim: Vec2,
) -> std::io::Result<()> {
    if let Some((c, r)) = screen.cell(state, aim, 0) {
        let glyph = if state.combat.hitmarker_timer > 0 {
            "✕"
        } else if state.weapons.crosshair_spread > 0 {
            "◌"
        } else {
            "+"
        };
        out.queue(cursor::MoveTo(c, r))?;
        out.queue(style::SetForegroundColor(C_CROSSHAIR))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, screen.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        "WASD : Move   Arrows : Aim   SPACE : Fire   R : Reload   Q : Quit   {}",
        weapon_legend(&state.catalog)
    )))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    screen: Screen,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = screen.width / 2;
    let start_row = (screen.height / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_upgrade_menu<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
) -> std::io::Result<()> {
    let mut lines = vec![
        ("╔══════════════════════════╗".to_string(), Color::Cyan),
        (format!("║   WAVE {:>2} CLEARED        ║", state.waves.wave - 1), Color::Cyan),
        ("╚══════════════════════════╝".to_string(), Color::Cyan),
    ];
    for (i, upgrade) in state.pending_upgrades.iter().enumerate() {
        lines.push((format!("[{}] {:<13} {}", i + 1, upgrade.name, upgrade.description), Color::White));
    }
    lines.push(("Choose an upgrade (1-3)".to_string(), C_HINT));
    draw_centered(out, screen, &lines)
}

fn profile_lines(profile: &Profile) -> Vec<(String, Color)> {
    vec![
        (format!("Best Score:    {:>7}", profile.best_score), Color::DarkGrey),
        (format!("Highest Wave:  {:>7}", profile.highest_wave), Color::DarkGrey),
        (format!("Longest Combo: {:>7}", profile.longest_combo), Color::DarkGrey),
        (format!("Total Kills:   {:>7}", profile.total_kills), Color::DarkGrey),
        (format!("Games Played:  {:>7}", profile.games_played), Color::DarkGrey),
    ]
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    let profile = &state.stats.profile;
    let new_best = state.tally.score >= profile.best_score && state.tally.score > 0;
    let score_line = if new_best {
        format!("★ NEW BEST: {:>7} ★", state.tally.score)
    } else {
        format!("Final Score:   {:>7}", state.tally.score)
    };

    let mut lines = vec![
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (score_line, Color::Yellow),
        (format!("Wave Reached:  {:>7}", state.waves.wave), Color::Yellow),
        (format!("Kills:         {:>7}", state.tally.kills), Color::Yellow),
        (format!("Best Combo:    {:>7}", state.combat.best_combo), Color::Yellow),
    ];
    lines.extend(profile_lines(profile));
    lines.push(("ENTER - Play Again  Q - Quit".to_string(), Color::White));
    draw_centered(out, screen, &lines)
}

/// Weapon keys as they appear on the number row.
fn weapon_legend(catalog: &Catalog) -> String {
    catalog
        .weapons()
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{}:{}", i + 1, w.name))
        .collect::<Vec<_>>()
        .join("  ")
}
