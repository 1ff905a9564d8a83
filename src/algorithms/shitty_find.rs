use super::{InstructionData, Libraries};
use crate::types::Command;

pub fn shitty_find(data: InstructionData, libraries: &mut Libraries<'_>) -> Option<Command> {
    let Some(target) = data.first_enemy() else {
        return libraries.random.pick(&data.available_commands).copied();
    };

    let dist_x = data.position.x - target.x;
    let dist_y = data.position.y - target.y;

    let mut best_directions = Vec::with_capacity(2);
    if dist_x != 0 {
        best_directions.push(if dist_x < 0 { Command::Right } else { Command::Left });
    }
    if dist_y != 0 {
        best_directions.push(if dist_y < 0 { Command::Down } else { Command::Up });
    }
    best_directions.retain(|command| data.is_available(*command));

    let choices = if best_directions.is_empty() {
        &data.available_commands
    } else {
        &best_directions
    };
    libraries.random.pick(choices).copied()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{open_world, snapshot};
    use super::*;
    use crate::rng::Rng;
    use crate::types::Command::{Down, Left, Right, Up};
    use crate::types::Position;

    fn decide(
        position: Position,
        available: &[Command],
        enemy: Position,
        seed: u32,
    ) -> Option<Command> {
        let world = open_world(12, 12);
        let data = snapshot(&world, position, available, &[], &[enemy]);
        let mut rng = Rng::new(seed);
        shitty_find(data, &mut Libraries::new(&mut rng, &world))
    }

    #[test]
    fn heads_straight_up_at_an_enemy_above() {
        for seed in 0..100u32 {
            assert_eq!(
                decide(Position::new(5, 5), &[Up, Down, Left, Right], Position::new(5, 2), seed),
                Some(Up)
            );
        }
    }

    #[test]
    fn picks_one_of_both_axes_on_a_diagonal() {
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200u32 {
            let command =
                decide(Position::new(5, 5), &[Up, Down, Left, Right], Position::new(8, 9), seed)
                    .expect("command");
            assert!(command == Right || command == Down);
            seen.insert(command);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn falls_back_to_any_available_when_blocked() {
        for seed in 0..100u32 {
            let command = decide(Position::new(5, 5), &[Left, Down], Position::new(5, 1), seed)
                .expect("command");
            assert!(command == Left || command == Down);
        }
    }

    #[test]
    fn uses_only_the_unblocked_preferred_axis() {
        for seed in 0..100u32 {
            assert_eq!(
                decide(Position::new(5, 5), &[Up, Left, Down], Position::new(9, 1), seed),
                Some(Up)
            );
        }
    }

    #[test]
    fn without_enemies_picks_any_available() {
        let world = open_world(4, 4);
        let data = snapshot(&world, Position::new(1, 1), &[Right], &[], &[]);
        let mut rng = Rng::new(2);
        assert_eq!(
            shitty_find(data, &mut Libraries::new(&mut rng, &world)),
            Some(Right)
        );
    }
}
