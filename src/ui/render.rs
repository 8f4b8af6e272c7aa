use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Paragraph},
    Frame,
};

use super::braille::BrailleCanvas;
use super::overlay::render_popup;
use crate::game::state::{GridPoint, SessionState, BALL_SIZE};

// Layout: Top status bar, bordered field, bottom hint line
// Row 0: status (level / score / timer / peers)
// Row 1: controls hint
// Rows 2 to N-2: field, scaled from board units into Braille pixels
// Row N-1: unused (border lives inside the canvas)
const UI_HEADER_ROWS: u16 = 2;

pub struct HudInfo {
    pub is_leader: bool,
    pub peer_count: usize,
    pub seconds_left: u32,
    pub tone: Option<u16>,
}

pub fn render(frame: &mut Frame, state: &SessionState, hud: &HudInfo) {
    let area = frame.area();

    // Draw background (true black RGB, not terminal default)
    let bg = Block::default().style(Style::default().bg(Color::Rgb(0, 0, 0)));
    frame.render_widget(bg, area);

    draw_status(frame, state, hud, area);

    if area.height <= UI_HEADER_ROWS {
        return;
    }

    let field_area = Rect {
        x: area.x,
        y: area.y + UI_HEADER_ROWS,
        width: area.width,
        height: area.height - UI_HEADER_ROWS,
    };

    let canvas_width = field_area.width as usize;
    let canvas_height = field_area.height as usize;
    let mut canvas = BrailleCanvas::new(canvas_width, canvas_height);

    // Scale from board units to Braille pixels
    let scale_x = canvas.pixel_width() as f32 / state.field_width;
    let scale_y = canvas.pixel_height() as f32 / state.field_height;

    canvas.draw_rect_outline(0, 0, canvas.pixel_width(), canvas.pixel_height());

    // Flag: small solid square
    draw_grid_marker(&mut canvas, state.board.flag, scale_x, scale_y, true);

    // Obstacles: hollow squares, visually distinct from the flag
    for baddie in &state.board.baddies {
        draw_grid_marker(&mut canvas, *baddie, scale_x, scale_y, false);
    }

    // Balls: every active roster member, local ball included
    for player in state.roster.iter().filter(|p| p.active) {
        let w = (BALL_SIZE * scale_x).max(2.0) as usize;
        let h = (BALL_SIZE * scale_y).max(2.0) as usize;
        let cx = (player.ball.x * scale_x) as usize;
        let cy = (player.ball.y * scale_y) as usize;
        canvas.fill_rect(cx.saturating_sub(w / 2), cy.saturating_sub(h / 2), w, h);
    }

    render_braille_canvas(frame, &canvas, field_area);

    if let Some(ref popup) = state.popup {
        render_popup(frame, popup, area);
    }
}

fn draw_grid_marker(
    canvas: &mut BrailleCanvas,
    point: GridPoint,
    scale_x: f32,
    scale_y: f32,
    solid: bool,
) {
    let w = (BALL_SIZE * scale_x).max(3.0) as usize;
    let h = (BALL_SIZE * scale_y).max(3.0) as usize;
    let x = (point.x as f32 * scale_x) as usize;
    let y = (point.y as f32 * scale_y) as usize;
    let x = x.saturating_sub(w / 2);
    let y = y.saturating_sub(h / 2);

    if solid {
        canvas.fill_rect(x, y, w, h);
    } else {
        canvas.draw_rect_outline(x, y, w, h);
    }
}

fn render_braille_canvas(frame: &mut Frame, canvas: &BrailleCanvas, area: Rect) {
    // Render each row of the Braille canvas
    for y in 0..canvas.pixel_height() / 4 {
        let mut line_text = String::new();
        for x in 0..canvas.pixel_width() / 2 {
            line_text.push(canvas.to_char(x, y));
        }

        let paragraph = Paragraph::new(line_text).style(Style::default().fg(Color::White));

        let row_area = Rect {
            x: area.x,
            y: area.y + y as u16,
            width: area.width,
            height: 1,
        };

        frame.render_widget(paragraph, row_area);
    }
}

fn draw_status(frame: &mut Frame, state: &SessionState, hud: &HudInfo, area: Rect) {
    let score = state.my_player().map(|p| p.score).unwrap_or(0);

    let mut status = format!(
        "level {}  score {}  time {:>2}s  peers {}",
        state.board.level, score, hud.seconds_left, hud.peer_count,
    );
    if hud.is_leader {
        status.push_str("  [leader]");
    }
    if let Some(tone) = hud.tone {
        status.push_str(&format!("  ♪{}Hz", tone));
    }

    let status_line = Paragraph::new(status)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(
        status_line,
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    let controls = Paragraph::new("Arrows: Tilt  Space: Level  Q: Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);

    frame.render_widget(
        controls,
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: 1,
        },
    );
}
