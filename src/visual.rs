use super::geometry::bounding_rect;
use super::location::*;
use fnv::FnvHashMap;

/// What a rendered tile represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Floor,
    Entrance,
    Furniture,
    Wall,
    Door,
}

impl TileKind {
    pub fn glyph(self) -> char {
        match self {
            TileKind::Floor => '.',
            TileKind::Entrance => 'e',
            TileKind::Furniture => 'F',
            TileKind::Wall => '#',
            TileKind::Door => '+',
        }
    }
}

pub trait RoomVisualizer {
    fn render(&mut self, location: TileCoord, kind: TileKind);
}

/// Collects rendered tiles into a text grid, for logs and tests.
#[derive(Default)]
pub struct AsciiVisualizer {
    tiles: FnvHashMap<TileCoord, TileKind>,
}

impl AsciiVisualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows over the bounding rectangle of everything rendered; unrendered
    /// tiles are blank.
    pub fn rows(&self) -> Vec<String> {
        let Some((min, max)) = bounding_rect(self.tiles.keys()) else {
            return Vec::new();
        };

        (min.y..=max.y)
            .map(|y| {
                (min.x..=max.x)
                    .map(|x| {
                        self.tiles
                            .get(&TileCoord::new(x, y))
                            .map_or(' ', |k| k.glyph())
                    })
                    .collect()
            })
            .collect()
    }

    pub fn render_to_string(&self) -> String {
        self.rows().join("\n")
    }
}

impl RoomVisualizer for AsciiVisualizer {
    fn render(&mut self, location: TileCoord, kind: TileKind) {
        self.tiles.insert(location, kind);
    }
}
