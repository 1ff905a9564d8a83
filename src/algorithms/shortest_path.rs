use super::{InstructionData, Libraries};
use crate::pathfinding::shortest_path;
use crate::types::Command;

pub fn shortest_path_step(data: InstructionData, libraries: &mut Libraries<'_>) -> Option<Command> {
    if let Some(target) = data.first_enemy() {
        let world = libraries.world();
        let path = shortest_path(
            data.position,
            target,
            |x, y| world.is_ground(x, y),
            libraries.random,
        );
        let step = path
            .next_step()
            .and_then(|next| Command::toward(data.position, next));
        if let Some(command) = step {
            return Some(command);
        }
    }
    // Unreachable target, or nothing to chase.
    libraries.random.pick(&data.available_commands).copied()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::snapshot;
    use super::*;
    use crate::rng::Rng;
    use crate::types::Command::{Down, Left, Right, Up};
    use crate::types::Position;
    use crate::world::World;

    #[test]
    fn corridor_moves_toward_target() {
        let world = World::from_rows(&["..."]);
        for seed in 0..20u32 {
            let data = snapshot(&world, Position::new(0, 0), &[Right], &[], &[Position::new(2, 0)]);
            let mut rng = Rng::new(seed);
            assert_eq!(
                shortest_path_step(data, &mut Libraries::new(&mut rng, &world)),
                Some(Right)
            );
        }
    }

    #[test]
    fn routes_around_a_wall() {
        let world = World::from_rows(&[
            ".....",
            ".###.",
            ".#...",
            ".###.",
            ".....",
        ]);
        // Straight down is open but leads the long way round.
        for seed in 0..50u32 {
            let data = snapshot(
                &world,
                Position::new(0, 0),
                &[Down, Right],
                &[],
                &[Position::new(2, 2)],
            );
            let mut rng = Rng::new(seed);
            assert_eq!(
                shortest_path_step(data, &mut Libraries::new(&mut rng, &world)),
                Some(Right)
            );
        }
    }

    #[test]
    fn unreachable_target_falls_back_to_random_choice() {
        let world = World::from_rows(&["..#.."]);
        for seed in 0..50u32 {
            let data = snapshot(
                &world,
                Position::new(0, 0),
                &[Right],
                &[],
                &[Position::new(4, 0)],
            );
            let mut rng = Rng::new(seed);
            assert_eq!(
                shortest_path_step(data, &mut Libraries::new(&mut rng, &world)),
                Some(Right)
            );
        }
    }

    #[test]
    fn adjacent_target_is_stepped_onto() {
        let world = World::from_rows(&["...", "...", "..."]);
        let data = snapshot(
            &world,
            Position::new(1, 1),
            &[Up, Down, Left, Right],
            &[],
            &[Position::new(1, 0)],
        );
        let mut rng = Rng::new(8);
        assert_eq!(
            shortest_path_step(data, &mut Libraries::new(&mut rng, &world)),
            Some(Up)
        );
    }

    #[test]
    fn chases_the_first_enemy_only() {
        let world = World::from_rows(&["....."]);
        let data = snapshot(
            &world,
            Position::new(2, 0),
            &[Left, Right],
            &[],
            &[Position::new(0, 0), Position::new(4, 0)],
        );
        let mut rng = Rng::new(5);
        assert_eq!(
            shortest_path_step(data, &mut Libraries::new(&mut rng, &world)),
            Some(Left)
        );
    }
}
