use super::{avoid_backtracking, InstructionData, Libraries};
use crate::types::Command;

pub fn random_movement(mut data: InstructionData, libraries: &mut Libraries<'_>) -> Option<Command> {
    let previous = data.previous_command();
    avoid_backtracking(&mut data.available_commands, previous);
    libraries.random.pick(&data.available_commands).copied()
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{open_world, snapshot};
    use super::*;
    use crate::rng::Rng;
    use crate::types::Command::{Down, Left, Right, Up};
    use crate::types::Position;

    #[test]
    fn never_reverses_when_alternatives_exist() {
        let world = open_world(5, 5);
        for previous in Command::ALL {
            for seed in 0..300u32 {
                let data = snapshot(
                    &world,
                    Position::new(2, 2),
                    &[Up, Down, Left, Right],
                    &[previous],
                    &[],
                );
                let mut rng = Rng::new(seed);
                let command =
                    random_movement(data, &mut Libraries::new(&mut rng, &world)).expect("command");
                assert_ne!(command, previous.opposite());
            }
        }
    }

    #[test]
    fn reverses_in_a_dead_end() {
        let world = open_world(5, 5);
        let data = snapshot(&world, Position::new(2, 2), &[Left], &[Right], &[]);
        let mut rng = Rng::new(3);
        assert_eq!(
            random_movement(data, &mut Libraries::new(&mut rng, &world)),
            Some(Left)
        );
    }

    #[test]
    fn covers_every_forward_option() {
        let world = open_world(5, 5);
        let mut seen = std::collections::HashSet::new();
        for seed in 0..300u32 {
            let data = snapshot(&world, Position::new(2, 2), &[Up, Down, Right], &[Down], &[]);
            let mut rng = Rng::new(seed);
            if let Some(command) = random_movement(data, &mut Libraries::new(&mut rng, &world)) {
                seen.insert(command);
            }
        }
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&Down));
        assert!(seen.contains(&Right));
    }

    #[test]
    fn first_move_can_go_anywhere() {
        let world = open_world(5, 5);
        let mut seen = std::collections::HashSet::new();
        for seed in 0..300u32 {
            let data = snapshot(&world, Position::new(2, 2), &[Up, Down, Left, Right], &[], &[]);
            let mut rng = Rng::new(seed);
            if let Some(command) = random_movement(data, &mut Libraries::new(&mut rng, &world)) {
                seen.insert(command);
            }
        }
        assert_eq!(seen.len(), 4);
    }
}
