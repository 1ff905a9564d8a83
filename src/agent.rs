use std::fmt;

use crate::algorithms::MovementAlgorithm;
use crate::types::{CharacterKind, Command, Position, RealPosition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tween {
    from: Position,
    to: Position,
    duration_ms: u64,
}

pub struct Agent {
    pub kind: CharacterKind,
    pub hostile: bool,
    position: Option<Position>,
    real_position: Option<RealPosition>,
    tween: Option<Tween>,
    history: Vec<Command>,
    algorithm: Box<dyn MovementAlgorithm>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("kind", &self.kind)
            .field("hostile", &self.hostile)
            .field("position", &self.position)
            .field("real_position", &self.real_position)
            .field("history", &self.history.len())
            .field("algorithm", &self.algorithm.name())
            .finish()
    }
}

impl Agent {
    pub fn new(kind: CharacterKind, hostile: bool, algorithm: Box<dyn MovementAlgorithm>) -> Self {
        Self {
            kind,
            hostile,
            position: None,
            real_position: None,
            tween: None,
            history: Vec::new(),
            algorithm,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn real_position(&self) -> Option<RealPosition> {
        self.real_position
    }

    pub fn history(&self) -> &[Command] {
        &self.history
    }

    pub fn last_command(&self) -> Option<Command> {
        self.history.last().copied()
    }

    pub fn algorithm_name(&self) -> &str {
        self.algorithm.name()
    }

    pub(crate) fn algorithm_mut(&mut self) -> &mut dyn MovementAlgorithm {
        self.algorithm.as_mut()
    }

    pub fn set_position(&mut self, position: Position, animation_ms: u64) {
        match self.position {
            Some(from) if animation_ms > 0 => {
                self.tween = Some(Tween {
                    from,
                    to: position,
                    duration_ms: animation_ms,
                });
                self.real_position = Some(from.into());
            }
            _ => {
                self.tween = None;
                self.real_position = Some(position.into());
            }
        }
        self.position = Some(position);
    }

    pub fn teleport_to(&mut self, position: Position) {
        self.set_position(position, 0);
    }

    pub fn update(&mut self, elapsed_ms: u64) {
        let Some(tween) = self.tween else {
            return;
        };
        let factor = (elapsed_ms as f32 / tween.duration_ms as f32).clamp(0.0, 1.0);
        self.real_position = Some(RealPosition {
            x: tween.from.x as f32 + (tween.to.x - tween.from.x) as f32 * factor,
            y: tween.from.y as f32 + (tween.to.y - tween.from.y) as f32 * factor,
        });
        if factor >= 1.0 {
            self.tween = None;
        }
    }

    pub(crate) fn commit(&mut self, command: Command, duration_ms: u64) -> Option<Position> {
        let to = command.apply(self.position?);
        self.history.push(command);
        self.set_position(to, duration_ms);
        Some(to)
    }
}

pub fn is_colliding(a: &Agent, b: &Agent) -> bool {
    let (Some(a), Some(b)) = (a.real_position(), b.real_position()) else {
        return false;
    };
    (a.x - b.x).abs() < 1.0 && (a.y - b.y).abs() < 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::BuiltinAlgorithm;

    fn agent(hostile: bool) -> Agent {
        Agent::new(
            CharacterKind::Zombie,
            hostile,
            Box::new(BuiltinAlgorithm::RandomMovement),
        )
    }

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-4
    }

    #[test]
    fn first_placement_is_not_animated() {
        let mut a = agent(true);
        a.set_position(Position::new(2, 3), 500);
        assert_eq!(a.real_position(), Some(RealPosition { x: 2.0, y: 3.0 }));
    }

    #[test]
    fn update_interpolates_and_stops_at_destination() {
        let mut a = agent(true);
        a.set_position(Position::new(0, 0), 0);
        a.set_position(Position::new(1, 0), 400);
        assert_eq!(a.position(), Some(Position::new(1, 0)));

        a.update(100);
        let real = a.real_position().expect("placed");
        assert!(approx_eq(real.x, 0.25));

        a.update(900);
        let real = a.real_position().expect("placed");
        assert!(approx_eq(real.x, 1.0));
        assert!(approx_eq(real.y, 0.0));
    }

    #[test]
    fn teleport_skips_animation() {
        let mut a = agent(false);
        a.set_position(Position::new(0, 0), 0);
        a.teleport_to(Position::new(9, 9));
        assert_eq!(a.real_position(), Some(RealPosition { x: 9.0, y: 9.0 }));
        a.update(10);
        assert_eq!(a.real_position(), Some(RealPosition { x: 9.0, y: 9.0 }));
    }

    #[test]
    fn collision_needs_overlap_on_both_axes() {
        let mut a = agent(false);
        let mut b = agent(true);
        assert!(!is_colliding(&a, &b));

        a.set_position(Position::new(3, 3), 0);
        b.set_position(Position::new(4, 3), 0);
        assert!(!is_colliding(&a, &b));

        b.set_position(Position::new(5, 3), 0);
        b.set_position(Position::new(4, 3), 100);
        b.update(50);
        assert!(!is_colliding(&a, &b));

        b.set_position(Position::new(3, 3), 100);
        b.update(50);
        assert!(is_colliding(&a, &b));
    }

    #[test]
    fn commit_records_history_and_moves() {
        let mut a = agent(true);
        assert_eq!(a.commit(Command::Up, 100), None);
        assert!(a.history().is_empty());

        a.set_position(Position::new(2, 2), 0);
        assert_eq!(a.commit(Command::Up, 100), Some(Position::new(2, 1)));
        assert_eq!(a.history(), &[Command::Up]);
        assert_eq!(a.last_command(), Some(Command::Up));
    }
}
