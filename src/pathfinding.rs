use std::collections::HashSet;

use crate::rng::Rng;
use crate::types::Position;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathResult {
    /// Cells ordered from the target back to the start, both included.
    Path(Vec<Position>),
    NoPath,
}

impl PathResult {
    pub fn next_step(&self) -> Option<Position> {
        match self {
            Self::Path(cells) if cells.len() >= 2 => cells.get(cells.len() - 2).copied(),
            _ => None,
        }
    }

    pub fn hops(&self) -> Option<usize> {
        match self {
            Self::Path(cells) => Some(cells.len().saturating_sub(1)),
            Self::NoPath => None,
        }
    }

    pub fn is_no_path(&self) -> bool {
        matches!(self, Self::NoPath)
    }
}

struct SearchNode {
    position: Position,
    parent: Option<usize>,
}

/// Neighbour order is shuffled on every expansion; the path length does not
/// depend on it. The target is matched before the passability check.
pub fn shortest_path<F>(start: Position, target: Position, is_ground: F, rng: &mut Rng) -> PathResult
where
    F: Fn(i32, i32) -> bool,
{
    let mut nodes = vec![SearchNode {
        position: start,
        parent: None,
    }];
    let mut visited = HashSet::from([start]);

    let mut cursor = 0;
    while cursor < nodes.len() {
        let p = nodes[cursor].position;
        let neighbours = rng.shuffle(vec![
            Position::new(p.x, p.y + 1),
            Position::new(p.x, p.y - 1),
            Position::new(p.x + 1, p.y),
            Position::new(p.x - 1, p.y),
        ]);

        for candidate in neighbours {
            if candidate == target {
                return PathResult::Path(collapse(&nodes, cursor, target));
            }
            if !is_ground(candidate.x, candidate.y) {
                continue;
            }
            if !visited.insert(candidate) {
                continue;
            }
            nodes.push(SearchNode {
                position: candidate,
                parent: Some(cursor),
            });
        }
        cursor += 1;
    }

    PathResult::NoPath
}

fn collapse(nodes: &[SearchNode], from: usize, target: Position) -> Vec<Position> {
    let mut path = vec![target];
    let mut current = Some(from);
    while let Some(idx) = current {
        let Some(node) = nodes.get(idx) else {
            break;
        };
        path.push(node.position);
        current = node.parent;
    }
    path
}

pub fn is_connected<F>(from: Position, to: Position, is_ground: F, rng: &mut Rng) -> bool
where
    F: Fn(i32, i32) -> bool,
{
    from == to || !shortest_path(from, to, is_ground, rng).is_no_path()
}
