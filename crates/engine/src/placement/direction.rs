/// Horizontal direction on the grid. East is +X, south is +Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Column offset `(dx, dz)` for one step in this direction.
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Pick the direction along whichever horizontal axis has the larger
    /// magnitude. Ties go to the X axis; a zero vector has no direction.
    pub fn dominant(dx: f32, dz: f32) -> Option<Direction> {
        if dx == 0.0 && dz == 0.0 {
            return None;
        }
        if dx.abs() >= dz.abs() {
            Some(if dx > 0.0 { Direction::East } else { Direction::West })
        } else {
            Some(if dz > 0.0 { Direction::South } else { Direction::North })
        }
    }

    /// Direction of a face normal's horizontal component.
    pub fn from_face_normal(normal: [f32; 3]) -> Option<Direction> {
        Self::dominant(normal[0], normal[2])
    }

    pub fn parse(name: &str) -> Option<Direction> {
        match name.to_ascii_lowercase().as_str() {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" => Some(Direction::West),
            _ => None,
        }
    }
}
