//! VBML layouts for the board
//!
//! A layout is a list of [`Component`]s that the VBML compose endpoint
//! turns into a 6x22 character-code grid.

use serde::Serialize;

use crate::model::Song;

pub const BOARD_ROWS: usize = 6;
pub const BOARD_COLUMNS: usize = 22;

/// Character codes for a board with every tile blank.
pub type CharacterGrid = Vec<Vec<u8>>;

pub fn blank_grid() -> CharacterGrid {
    vec![vec![0; BOARD_COLUMNS]; BOARD_ROWS]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Justify {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Top,
    Center,
    Bottom,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Style {
    pub justify: Justify,
    pub align: Align,
    pub height: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Component {
    pub style: Style,
    pub template: String,
}

impl Component {
    /// Centered, full height.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            style: Style {
                justify: Justify::Center,
                align: Align::Center,
                height: BOARD_ROWS as u8,
            },
            template: template.into(),
        }
    }

    pub fn justify(mut self, justify: Justify) -> Self {
        self.style.justify = justify;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.style.align = align;
        self
    }

    pub fn height(mut self, height: u8) -> Self {
        self.style.height = height;
        self
    }
}

/// Body of a VBML compose request.
#[derive(Debug, Serialize)]
pub struct ComposeRequest<'a> {
    pub components: &'a [Component],
}

// Color tile codes
const RED: &str = "{63}";
const ORANGE: &str = "{64}";
const YELLOW: &str = "{65}";
const GREEN: &str = "{66}";
const BLUE: &str = "{67}";
const VIOLET: &str = "{68}";

/// "Now Playing" over the top three rows, "Next Up" over the bottom three.
pub fn now_playing_layout(current: Option<&Song>, next: Option<&Song>) -> Vec<Component> {
    let now_playing = match current {
        Some(song) => format!(
            "{GREEN} Now Playing\n{ORANGE} {}\n{VIOLET} {}",
            song.trimmed_title(),
            song.artist
        ),
        None => format!("{GREEN} Now Playing\n{RED} Nothing playing"),
    };
    let up_next = match next {
        Some(song) => format!("\n{YELLOW} Next Up\n{BLUE} {}", song.trimmed_title()),
        None => format!("\n{YELLOW} Next Up\n{BLUE} Nothing queued"),
    };

    vec![
        Component::new(now_playing)
            .justify(Justify::Left)
            .align(Align::Top)
            .height(3),
        Component::new(up_next)
            .justify(Justify::Left)
            .align(Align::Top)
            .height(3),
    ]
}
