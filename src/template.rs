//! Room templates: fixed cell grids describing a room's furniture and entrance
//! layout before it is placed in the world.
//!
//! Templates are read-only once built. Rotation variants are distinct templates
//! produced up front (see [`RoomTemplate::all_rotations`]); placement never
//! rotates at runtime.

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to one furniture placement within a template.
///
/// Every cell covered by a multi-cell piece carries an equal reference, so
/// `instance` distinguishes two pieces of the same definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FurnitureRef {
    pub def: String,
    pub instance: u32,
}

impl FurnitureRef {
    pub fn new(def: impl Into<String>, instance: u32) -> Self {
        FurnitureRef {
            def: def.into(),
            instance,
        }
    }
}

impl fmt::Display for FurnitureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.def, self.instance)
    }
}

/// One cell of a template grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Free interior floor.
    Empty,
    /// Free interior floor flagged as a preferred door approach.
    Entrance,
    /// Floor covered by furniture. `entrance` marks a furnished cell that
    /// prefers an adjacent door (e.g. an item with no-wall cells).
    Occupied {
        furniture: FurnitureRef,
        entrance: bool,
    },
}

impl Cell {
    pub fn occupied(furniture: FurnitureRef) -> Self {
        Cell::Occupied {
            furniture,
            entrance: false,
        }
    }

    pub fn occupied_entrance(furniture: FurnitureRef) -> Self {
        Cell::Occupied {
            furniture,
            entrance: true,
        }
    }

    pub fn is_entrance(&self) -> bool {
        matches!(
            self,
            Cell::Entrance
                | Cell::Occupied {
                    entrance: true,
                    ..
                }
        )
    }

    pub fn furniture(&self) -> Option<&FurnitureRef> {
        match self {
            Cell::Occupied { furniture, .. } => Some(furniture),
            _ => None,
        }
    }
}

/// Quarter-turn rotation of a room variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    pub fn quarter_turns(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn next_cw(self) -> Self {
        Rotation::from_quarter_turns(self.quarter_turns() + 1)
    }
}

/// Registry key for a template: room type, layout variation and rotation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlueprintKey {
    pub room_type: String,
    pub variation: u32,
    pub rotation: Rotation,
}

impl BlueprintKey {
    pub fn new(room_type: impl Into<String>, variation: u32, rotation: Rotation) -> Self {
        BlueprintKey {
            room_type: room_type.into(),
            variation,
            rotation,
        }
    }
}

impl fmt::Display for BlueprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.room_type,
            self.variation,
            self.rotation.quarter_turns() as u32 * 90
        )
    }
}

/// A fixed W×H grid of cells. Every cell is part of the room footprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTemplate {
    name: String,
    width: u32,
    height: u32,
    rotation: Rotation,
    cells: Vec<Cell>,
}

impl RoomTemplate {
    /// An empty template. Returns `None` for a zero dimension.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        Some(RoomTemplate {
            name: name.into(),
            width,
            height,
            rotation: Rotation::R0,
            cells: vec![Cell::Empty; (width * height) as usize],
        })
    }

    /// Build a template from text rows.
    ///
    /// `.` is an empty cell and `e` an entrance cell. Any other character is
    /// furniture: an uppercase letter is a furniture cell and its lowercase
    /// counterpart is the same piece flagged as an entrance. Cells with the same
    /// letter that touch orthogonally form one piece. The definition name of a piece
    /// comes from `legend`. Returns `None` if the rows are ragged or empty, or if a
    /// letter has no legend entry.
    pub fn from_rows(
        name: impl Into<String>,
        rows: &[&str],
        legend: &[(char, &str)],
    ) -> Option<Self> {
        let height = rows.len() as u32;
        let width = rows.first()?.chars().count() as u32;
        if rows.iter().any(|r| r.chars().count() as u32 != width) {
            return None;
        }

        let mut template = RoomTemplate::new(name, width, height)?;
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        let mut piece_of: FnvHashMap<(u32, u32), u32> = FnvHashMap::default();
        let mut next_instance = 0u32;

        for y in 0..height {
            for x in 0..width {
                let ch = grid[y as usize][x as usize];
                let cell = match ch {
                    '.' => Cell::Empty,
                    'e' => Cell::Entrance,
                    _ => {
                        let key = ch.to_ascii_uppercase();
                        let def = legend
                            .iter()
                            .find(|(c, _)| *c == key)
                            .map(|(_, d)| *d)?;

                        let instance = match piece_of.get(&(x, y)) {
                            Some(instance) => *instance,
                            None => {
                                let instance = next_instance;
                                next_instance += 1;
                                flood_piece(&grid, key, (x, y), instance, &mut piece_of);
                                instance
                            }
                        };

                        Cell::Occupied {
                            furniture: FurnitureRef::new(def, instance),
                            entrance: ch.is_ascii_lowercase(),
                        }
                    }
                };
                template.set_cell(x, y, cell);
            }
        }

        Some(template)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn cell(&self, x: u32, y: u32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Set a cell while building the template. Out-of-range writes are ignored.
    pub fn set_cell(&mut self, x: u32, y: u32, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = cell;
        }
    }

    /// Mark every cell of a `w`×`h` block at `(x, y)` as covered by `furniture`.
    pub fn place_furniture(&mut self, x: u32, y: u32, w: u32, h: u32, furniture: FurnitureRef) {
        for cy in y..y.saturating_add(h) {
            for cx in x..x.saturating_add(w) {
                self.set_cell(cx, cy, Cell::occupied(furniture.clone()));
            }
        }
    }

    /// Cells in scan order with their template-local coordinates.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &Cell)> {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (((i as u32) % width, (i as u32) / width), c))
    }

    pub fn entrance_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_entrance()).count()
    }

    /// Check structural requirements:
    /// - at most one entrance-flagged cell per furniture piece;
    /// - the cells of each piece are orthogonally connected.
    pub fn validate(&self) -> bool {
        let mut pieces: FnvHashMap<&FurnitureRef, Vec<(u32, u32)>> = FnvHashMap::default();
        let mut entrances: FnvHashMap<&FurnitureRef, usize> = FnvHashMap::default();

        for (pos, cell) in self.cells() {
            if let Cell::Occupied { furniture, entrance } = cell {
                pieces.entry(furniture).or_default().push(pos);
                if *entrance {
                    *entrances.entry(furniture).or_default() += 1;
                }
            }
        }

        if entrances.values().any(|count| *count > 1) {
            return false;
        }

        pieces.values().all(|cells| is_connected(cells))
    }

    /// Rotate the template 90 degrees clockwise.
    ///
    /// Cell `(x, y)` of a W×H grid moves to `(H - 1 - y, x)` of an H×W grid.
    pub fn rotated_cw(&self) -> RoomTemplate {
        let (w, h) = (self.width, self.height);
        let mut cells = vec![Cell::Empty; self.cells.len()];
        for ((x, y), cell) in self.cells() {
            let nx = h - 1 - y;
            let ny = x;
            cells[(ny * h + nx) as usize] = cell.clone();
        }

        RoomTemplate {
            name: self.name.clone(),
            width: h,
            height: w,
            rotation: self.rotation.next_cw(),
            cells,
        }
    }

    /// All 4 rotations of this template, starting with itself.
    pub fn all_rotations(&self) -> Vec<RoomTemplate> {
        let r0 = self.clone();
        let r1 = r0.rotated_cw();
        let r2 = r1.rotated_cw();
        let r3 = r2.rotated_cw();
        vec![r0, r1, r2, r3]
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }
}

fn flood_piece(
    grid: &[Vec<char>],
    key: char,
    start: (u32, u32),
    instance: u32,
    piece_of: &mut FnvHashMap<(u32, u32), u32>,
) {
    let mut stack = vec![start];
    while let Some((x, y)) = stack.pop() {
        if piece_of.contains_key(&(x, y)) {
            continue;
        }
        piece_of.insert((x, y), instance);

        let candidates = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in candidates {
            let same = grid
                .get(ny as usize)
                .and_then(|row| row.get(nx as usize))
                .is_some_and(|c| c.to_ascii_uppercase() == key);
            if same && !piece_of.contains_key(&(nx, ny)) {
                stack.push((nx, ny));
            }
        }
    }
}

fn is_connected(cells: &[(u32, u32)]) -> bool {
    let Some(&first) = cells.first() else {
        return true;
    };

    let mut seen = vec![first];
    let mut frontier = vec![first];
    while let Some((x, y)) = frontier.pop() {
        for &(cx, cy) in cells {
            let touches = (cx.abs_diff(x) + cy.abs_diff(y)) == 1;
            if touches && !seen.contains(&(cx, cy)) {
                seen.push((cx, cy));
                frontier.push((cx, cy));
            }
        }
    }
    seen.len() == cells.len()
}

/// In-memory template registry keyed by [`BlueprintKey`].
#[derive(Clone, Debug, Default)]
pub struct BlueprintRegistry {
    templates: FnvHashMap<BlueprintKey, RoomTemplate>,
}

impl BlueprintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a base template (rotation 0) and all of its rotation variants.
    pub fn register(
        &mut self,
        room_type: impl Into<String>,
        variation: u32,
        template: RoomTemplate,
    ) {
        let room_type = room_type.into();
        for variant in template.all_rotations() {
            let key = BlueprintKey::new(room_type.clone(), variation, variant.rotation());
            self.templates.insert(key, variant);
        }
    }

    pub fn get(&self, key: &BlueprintKey) -> Option<&RoomTemplate> {
        self.templates.get(key)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
