//! Puzzle state representation and move group.
//!
//! A state is four faces of nine stickers each, ordered Front, Right,
//! Left, Bottom. The move group has eight generators: a forward and a
//! backward twist around each of the four vertices, each permuting four
//! disjoint 3-sticker cycles. The tip sticker of each vertex can
//! additionally be twisted on its own; tips sit outside the move group
//! and are handled by a separate alignment pass in the solver.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of faces.
pub const FACE_COUNT: usize = 4;
/// Stickers per face.
pub const FACE_STICKERS: usize = 9;
/// Total stickers in a state.
pub const STICKER_COUNT: usize = FACE_COUNT * FACE_STICKERS;

/// Face indices in state order.
pub const FRONT: usize = 0;
pub const RIGHT: usize = 1;
pub const LEFT: usize = 2;
pub const BOTTOM: usize = 3;

/// A (face, sticker) position.
///
/// Sticker indices within a face: 0 is the tip, 1-3 the middle row,
/// 4-8 the base row.
pub type Pos = (usize, usize);

/// One of the four sticker colors.
///
/// The discriminants are the 2-bit codes used by the packed key format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Red = 0,
    Green = 1,
    Blue = 2,
    Yellow = 3,
}

impl Color {
    /// All colors in code order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

    /// The 2-bit code of this color.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes the low two bits of `code`.
    #[inline]
    pub const fn from_code(code: u8) -> Color {
        match code & 0b11 {
            0 => Color::Red,
            1 => Color::Green,
            2 => Color::Blue,
            _ => Color::Yellow,
        }
    }

    /// The one-letter lowercase symbol used in state strings.
    pub const fn symbol(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Green => 'g',
            Color::Blue => 'b',
            Color::Yellow => 'y',
        }
    }

    /// Parses a state-string symbol.
    pub fn from_symbol(symbol: char) -> Option<Color> {
        match symbol {
            'r' => Some(Color::Red),
            'g' => Some(Color::Green),
            'b' => Some(Color::Blue),
            'y' => Some(Color::Yellow),
            _ => None,
        }
    }
}

/// A face move: one of the eight generators of the puzzle's move group.
///
/// Plain moves rotate their cycles forward, primed moves backward; each
/// pair is mutually inverse. The discriminants are the move codes stored
/// in table records.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Move {
    U = 0,
    Ui = 1,
    R = 2,
    Ri = 3,
    L = 4,
    Li = 5,
    B = 6,
    Bi = 7,
}

/// The four 3-sticker cycles moved by each vertex twist.
///
/// A plain move shifts each cycle forward: position 0 takes the value of
/// position 1, and so on around. The last cycle of each table is the
/// vertex's tip, which rides along with the face move.
const U_CYCLES: [[Pos; 3]; 4] = [
    [(FRONT, 0), (RIGHT, 0), (LEFT, 0)],
    [(FRONT, 1), (RIGHT, 1), (LEFT, 1)],
    [(FRONT, 2), (RIGHT, 2), (LEFT, 2)],
    [(FRONT, 3), (RIGHT, 3), (LEFT, 3)],
];
const R_CYCLES: [[Pos; 3]; 4] = [
    [(FRONT, 3), (BOTTOM, 6), (RIGHT, 6)],
    [(FRONT, 7), (BOTTOM, 7), (RIGHT, 5)],
    [(FRONT, 6), (BOTTOM, 3), (RIGHT, 1)],
    [(FRONT, 8), (BOTTOM, 8), (RIGHT, 4)],
];
const L_CYCLES: [[Pos; 3]; 4] = [
    [(FRONT, 1), (LEFT, 6), (BOTTOM, 6)],
    [(FRONT, 5), (LEFT, 7), (BOTTOM, 5)],
    [(FRONT, 6), (LEFT, 3), (BOTTOM, 1)],
    [(FRONT, 4), (LEFT, 8), (BOTTOM, 4)],
];
const B_CYCLES: [[Pos; 3]; 4] = [
    [(RIGHT, 3), (BOTTOM, 3), (LEFT, 6)],
    [(RIGHT, 7), (BOTTOM, 2), (LEFT, 5)],
    [(RIGHT, 6), (BOTTOM, 1), (LEFT, 1)],
    [(RIGHT, 8), (BOTTOM, 0), (LEFT, 4)],
];

impl Move {
    /// All moves in code order.
    pub const ALL: [Move; 8] = [
        Move::U,
        Move::Ui,
        Move::R,
        Move::Ri,
        Move::L,
        Move::Li,
        Move::B,
        Move::Bi,
    ];

    /// The table record code of this move (0-7).
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a table record code.
    pub const fn from_code(code: u8) -> Option<Move> {
        match code {
            0 => Some(Move::U),
            1 => Some(Move::Ui),
            2 => Some(Move::R),
            3 => Some(Move::Ri),
            4 => Some(Move::L),
            5 => Some(Move::Li),
            6 => Some(Move::B),
            7 => Some(Move::Bi),
            _ => None,
        }
    }

    /// The move undoing this one.
    pub const fn inverse(self) -> Move {
        match self {
            Move::U => Move::Ui,
            Move::Ui => Move::U,
            Move::R => Move::Ri,
            Move::Ri => Move::R,
            Move::L => Move::Li,
            Move::Li => Move::L,
            Move::B => Move::Bi,
            Move::Bi => Move::B,
        }
    }

    /// True for the backward (primed) member of each pair.
    #[inline]
    const fn is_prime(self) -> bool {
        self.code() % 2 == 1
    }

    const fn cycles(self) -> &'static [[Pos; 3]; 4] {
        match self {
            Move::U | Move::Ui => &U_CYCLES,
            Move::R | Move::Ri => &R_CYCLES,
            Move::L | Move::Li => &L_CYCLES,
            Move::B | Move::Bi => &B_CYCLES,
        }
    }

    const fn letter(self) -> char {
        match self {
            Move::U | Move::Ui => 'U',
            Move::R | Move::Ri => 'R',
            Move::L | Move::Li => 'L',
            Move::B | Move::Bi => 'B',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), if self.is_prime() { "'" } else { "" })
    }
}

/// An independent twist of one tip cycle against the rest of the puzzle.
///
/// Face moves carry tips along with their vertex, so no face move can
/// disturb an aligned tip's relation to its vertex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TipTwist {
    U,
    Ui,
    R,
    Ri,
    L,
    Li,
    B,
    Bi,
}

const TIP_U: [Pos; 3] = [(FRONT, 0), (RIGHT, 0), (LEFT, 0)];
const TIP_R: [Pos; 3] = [(FRONT, 8), (BOTTOM, 8), (RIGHT, 4)];
const TIP_L: [Pos; 3] = [(FRONT, 4), (LEFT, 8), (BOTTOM, 4)];
const TIP_B: [Pos; 3] = [(BOTTOM, 0), (LEFT, 4), (RIGHT, 8)];

impl TipTwist {
    /// The twist undoing this one.
    pub const fn inverse(self) -> TipTwist {
        match self {
            TipTwist::U => TipTwist::Ui,
            TipTwist::Ui => TipTwist::U,
            TipTwist::R => TipTwist::Ri,
            TipTwist::Ri => TipTwist::R,
            TipTwist::L => TipTwist::Li,
            TipTwist::Li => TipTwist::L,
            TipTwist::B => TipTwist::Bi,
            TipTwist::Bi => TipTwist::B,
        }
    }

    const fn is_prime(self) -> bool {
        matches!(
            self,
            TipTwist::Ui | TipTwist::Ri | TipTwist::Li | TipTwist::Bi
        )
    }

    const fn cycle(self) -> &'static [Pos; 3] {
        match self {
            TipTwist::U | TipTwist::Ui => &TIP_U,
            TipTwist::R | TipTwist::Ri => &TIP_R,
            TipTwist::L | TipTwist::Li => &TIP_L,
            TipTwist::B | TipTwist::Bi => &TIP_B,
        }
    }

    const fn letter(self) -> char {
        match self {
            TipTwist::U | TipTwist::Ui => 'u',
            TipTwist::R | TipTwist::Ri => 'r',
            TipTwist::L | TipTwist::Li => 'l',
            TipTwist::B | TipTwist::Bi => 'b',
        }
    }
}

impl fmt::Display for TipTwist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), if self.is_prime() { "'" } else { "" })
    }
}

/// One element of a solving sequence: a face move or a tip twist.
///
/// Tokens render as the vertex letter, uppercase for face moves and
/// lowercase for tips, with a trailing `'` for the backward direction.
/// A trailing backtick is accepted on input as a prime synonym.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Face(Move),
    Tip(TipTwist),
}

impl Step {
    /// The step undoing this one.
    pub const fn inverse(self) -> Step {
        match self {
            Step::Face(mv) => Step::Face(mv.inverse()),
            Step::Tip(twist) => Step::Tip(twist.inverse()),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Face(mv) => mv.fmt(f),
            Step::Tip(twist) => twist.fmt(f),
        }
    }
}

/// Error parsing a move token.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("unrecognized move token {0:?}")]
pub struct ParseStepError(pub String);

impl FromStr for Step {
    type Err = ParseStepError;

    fn from_str(token: &str) -> Result<Step, ParseStepError> {
        let mut chars = token.chars();
        let Some(letter) = chars.next() else {
            return Err(ParseStepError(token.to_string()));
        };
        let prime = match (chars.next(), chars.next()) {
            (None, _) => false,
            (Some('\''), None) | (Some('`'), None) => true,
            _ => return Err(ParseStepError(token.to_string())),
        };
        let step = match (letter, prime) {
            ('U', false) => Step::Face(Move::U),
            ('U', true) => Step::Face(Move::Ui),
            ('R', false) => Step::Face(Move::R),
            ('R', true) => Step::Face(Move::Ri),
            ('L', false) => Step::Face(Move::L),
            ('L', true) => Step::Face(Move::Li),
            ('B', false) => Step::Face(Move::B),
            ('B', true) => Step::Face(Move::Bi),
            ('u', false) => Step::Tip(TipTwist::U),
            ('u', true) => Step::Tip(TipTwist::Ui),
            ('r', false) => Step::Tip(TipTwist::R),
            ('r', true) => Step::Tip(TipTwist::Ri),
            ('l', false) => Step::Tip(TipTwist::L),
            ('l', true) => Step::Tip(TipTwist::Li),
            ('b', false) => Step::Tip(TipTwist::B),
            ('b', true) => Step::Tip(TipTwist::Bi),
            _ => return Err(ParseStepError(token.to_string())),
        };
        Ok(step)
    }
}

/// Error parsing a state or scan string.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ParseStateError {
    #[error("state must be {STICKER_COUNT} stickers, got {0}")]
    WrongLength(usize),
    #[error("unrecognized sticker symbol {0:?} at position {1}")]
    BadSymbol(char, usize),
}

/// A fully resolved puzzle configuration.
///
/// Value type: every transition copies. Equality is sticker-for-sticker.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct State {
    faces: [[Color; FACE_STICKERS]; FACE_COUNT],
}

impl State {
    /// Builds a state from flat face-major stickers.
    pub fn from_stickers(stickers: [Color; STICKER_COUNT]) -> State {
        let mut faces = [[Color::Red; FACE_STICKERS]; FACE_COUNT];
        for (index, &color) in stickers.iter().enumerate() {
            faces[index / FACE_STICKERS][index % FACE_STICKERS] = color;
        }
        State { faces }
    }

    /// The sticker at a (face, index) position.
    #[inline]
    pub fn at(&self, face: usize, index: usize) -> Color {
        self.faces[face][index]
    }

    /// The sticker at a flat face-major index.
    #[inline]
    pub fn sticker(&self, index: usize) -> Color {
        self.faces[index / FACE_STICKERS][index % FACE_STICKERS]
    }

    /// Replaces the sticker at a flat face-major index.
    pub fn with_sticker(mut self, index: usize, color: Color) -> State {
        self.faces[index / FACE_STICKERS][index % FACE_STICKERS] = color;
        self
    }

    /// Applies a face move, returning the successor state.
    pub fn apply(&self, mv: Move) -> State {
        let mut next = *self;
        for cycle in mv.cycles() {
            next.rotate_cycle(cycle, mv.is_prime());
        }
        next
    }

    /// Applies an independent tip twist.
    pub fn apply_tip(&self, twist: TipTwist) -> State {
        let mut next = *self;
        next.rotate_cycle(twist.cycle(), twist.is_prime());
        next
    }

    /// Applies one element of a solving sequence.
    pub fn apply_step(&self, step: Step) -> State {
        match step {
            Step::Face(mv) => self.apply(mv),
            Step::Tip(twist) => self.apply_tip(twist),
        }
    }

    fn rotate_cycle(&mut self, cycle: &[Pos; 3], backward: bool) {
        let [(af, ai), (bf, bi), (cf, ci)] = *cycle;
        let (va, vb, vc) = (self.faces[af][ai], self.faces[bf][bi], self.faces[cf][ci]);
        if backward {
            self.faces[af][ai] = vc;
            self.faces[bf][bi] = va;
            self.faces[cf][ci] = vb;
        } else {
            self.faces[af][ai] = vb;
            self.faces[bf][bi] = vc;
            self.faces[cf][ci] = va;
        }
    }

    /// True when every face is monochrome.
    pub fn is_solved(&self) -> bool {
        self.faces
            .iter()
            .all(|face| face.iter().all(|&sticker| sticker == face[0]))
    }

    /// Reorients the whole puzzle one step around the up axis.
    ///
    /// Front, Right, Left become the old Right, Left, Front; the bottom
    /// face spins in place under the fixed index mapping.
    pub fn rotated(&self) -> State {
        // new bottom position of each old bottom sticker
        const BOTTOM_MAP: [usize; FACE_STICKERS] = [8, 3, 7, 6, 0, 2, 1, 5, 4];

        let mut next = *self;
        next.faces[FRONT] = self.faces[RIGHT];
        next.faces[RIGHT] = self.faces[LEFT];
        next.faces[LEFT] = self.faces[FRONT];
        for (source, &dest) in BOTTOM_MAP.iter().enumerate() {
            next.faces[BOTTOM][dest] = self.faces[BOTTOM][source];
        }
        next
    }

    /// Normalizes the whole-puzzle orientation for scanned input.
    ///
    /// The corner piece at positions (F7, B7, R5) never leaves them under
    /// any face move, so its colors identify the puzzle's physical
    /// orientation. Rotate 0, 1, or 2 steps until red sits in that
    /// corner; afterwards the red face is front or bottom.
    pub fn canonicalized(&self) -> State {
        let f = &self.faces;
        let red = Color::Red;
        if f[FRONT][7] != red && f[RIGHT][5] != red && f[BOTTOM][7] != red {
            self.rotated().rotated()
        } else if f[FRONT][5] != red && f[LEFT][7] != red && f[BOTTOM][5] != red {
            self.rotated()
        } else {
            *self
        }
    }

    /// Renders the state as an unfolded net (left, front, right faces on
    /// top, bottom face below).
    pub fn net(&self) -> String {
        Scan::from(*self).net()
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for face in &self.faces {
            for sticker in face {
                write!(f, "{}", sticker.symbol())?;
            }
        }
        Ok(())
    }
}

impl FromStr for State {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<State, ParseStateError> {
        let symbols: Vec<char> = s.chars().collect();
        if symbols.len() != STICKER_COUNT {
            return Err(ParseStateError::WrongLength(symbols.len()));
        }
        let mut stickers = [Color::Red; STICKER_COUNT];
        for (index, &symbol) in symbols.iter().enumerate() {
            stickers[index] = Color::from_symbol(symbol)
                .ok_or(ParseStateError::BadSymbol(symbol, index))?;
        }
        Ok(State::from_stickers(stickers))
    }
}

/// A scanned configuration as delivered by the vision pipeline.
///
/// Stickers the scanner could not classify are `None` (`?` in string
/// form; `.` and `_` are accepted as synonyms).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Scan {
    stickers: [Option<Color>; STICKER_COUNT],
}

impl Scan {
    /// The scanned sticker at a flat face-major index, if known.
    #[inline]
    pub fn sticker(&self, index: usize) -> Option<Color> {
        self.stickers[index]
    }

    /// Replaces the sticker at a flat face-major index.
    pub fn with_sticker(mut self, index: usize, sticker: Option<Color>) -> Scan {
        self.stickers[index] = sticker;
        self
    }

    /// Number of unknown stickers.
    pub fn unknown_count(&self) -> usize {
        self.stickers.iter().filter(|s| s.is_none()).count()
    }

    /// How many known stickers carry each color, in code order.
    pub fn color_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for sticker in self.stickers.iter().flatten() {
            counts[sticker.code() as usize] += 1;
        }
        counts
    }

    /// The fully resolved state, if no sticker is unknown.
    pub fn resolved(&self) -> Option<State> {
        let mut stickers = [Color::Red; STICKER_COUNT];
        for (index, sticker) in self.stickers.iter().enumerate() {
            stickers[index] = (*sticker)?;
        }
        Some(State::from_stickers(stickers))
    }

    fn symbol(&self, face: usize, index: usize) -> char {
        match self.stickers[face * FACE_STICKERS + index] {
            Some(color) => color.symbol(),
            None => '?',
        }
    }

    /// Renders the scan as an unfolded net.
    pub fn net(&self) -> String {
        let run = |face: usize, from: usize, to: usize| -> String {
            (from..to).map(|index| self.symbol(face, index)).collect()
        };

        let mut out = String::new();
        out.push_str(&format!(
            "  {}      {}      {}\n",
            self.symbol(LEFT, 0),
            self.symbol(FRONT, 0),
            self.symbol(RIGHT, 0)
        ));
        out.push_str(&format!(
            " {}    {}    {}\n",
            run(LEFT, 1, 4),
            run(FRONT, 1, 4),
            run(RIGHT, 1, 4)
        ));
        out.push_str(&format!(
            "{}  {}  {}\n",
            run(LEFT, 4, 9),
            run(FRONT, 4, 9),
            run(RIGHT, 4, 9)
        ));
        out.push('\n');
        out.push_str(&format!("       {}\n", run(BOTTOM, 4, 9)));
        out.push_str(&format!("        {}\n", run(BOTTOM, 1, 4)));
        out.push_str(&format!("         {}\n", self.symbol(BOTTOM, 0)));
        out
    }
}

impl From<State> for Scan {
    fn from(state: State) -> Scan {
        let mut stickers = [None; STICKER_COUNT];
        for (index, sticker) in stickers.iter_mut().enumerate() {
            *sticker = Some(state.sticker(index));
        }
        Scan { stickers }
    }
}

impl fmt::Display for Scan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for face in 0..FACE_COUNT {
            for index in 0..FACE_STICKERS {
                write!(f, "{}", self.symbol(face, index))?;
            }
        }
        Ok(())
    }
}

impl FromStr for Scan {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Scan, ParseStateError> {
        let symbols: Vec<char> = s.chars().collect();
        if symbols.len() != STICKER_COUNT {
            return Err(ParseStateError::WrongLength(symbols.len()));
        }
        let mut stickers = [None; STICKER_COUNT];
        for (index, &symbol) in symbols.iter().enumerate() {
            stickers[index] = match symbol {
                '?' | '.' | '_' => None,
                _ => Some(
                    Color::from_symbol(symbol)
                        .ok_or(ParseStateError::BadSymbol(symbol, index))?,
                ),
            };
        }
        Ok(Scan { stickers })
    }
}

/// An assignment of the four colors to the four faces.
///
/// Twelve distinct assignments are reachable from the reference solved
/// state by whole-puzzle reorientation; a scanner cannot know which one
/// it is looking at, so all twelve get their own move table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Orientation(pub [Color; FACE_COUNT]);

impl Orientation {
    /// The twelve reachable solved colorings, front/right/left/bottom.
    pub const ALL: [Orientation; 12] = [
        Orientation([Color::Red, Color::Blue, Color::Yellow, Color::Green]),
        Orientation([Color::Red, Color::Green, Color::Blue, Color::Yellow]),
        Orientation([Color::Green, Color::Yellow, Color::Blue, Color::Red]),
        Orientation([Color::Blue, Color::Yellow, Color::Red, Color::Green]),
        Orientation([Color::Red, Color::Yellow, Color::Green, Color::Blue]),
        Orientation([Color::Green, Color::Blue, Color::Red, Color::Yellow]),
        Orientation([Color::Green, Color::Red, Color::Yellow, Color::Blue]),
        Orientation([Color::Yellow, Color::Blue, Color::Green, Color::Red]),
        Orientation([Color::Yellow, Color::Red, Color::Blue, Color::Green]),
        Orientation([Color::Yellow, Color::Green, Color::Red, Color::Blue]),
        Orientation([Color::Blue, Color::Green, Color::Yellow, Color::Red]),
        Orientation([Color::Blue, Color::Red, Color::Green, Color::Yellow]),
    ];

    /// The solved state colored by this orientation.
    pub fn solved_state(self) -> State {
        State {
            faces: self.0.map(|color| [color; FACE_STICKERS]),
        }
    }

    /// Parses a 4-letter face-color code such as `rygb`.
    pub fn from_code(code: &str) -> Option<Orientation> {
        let symbols: Vec<char> = code.chars().collect();
        let [front, right, left, bottom] = symbols.as_slice() else {
            return None;
        };
        Some(Orientation([
            Color::from_symbol(*front)?,
            Color::from_symbol(*right)?,
            Color::from_symbol(*left)?,
            Color::from_symbol(*bottom)?,
        ]))
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in self.0 {
            write!(f, "{}", color.symbol())?;
        }
        Ok(())
    }
}
