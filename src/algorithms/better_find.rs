use super::{avoid_backtracking, preferred_axes, InstructionData, Libraries};
use crate::types::Command;

pub fn better_find(mut data: InstructionData, libraries: &mut Libraries<'_>) -> Option<Command> {
    let previous = data.previous_command();
    avoid_backtracking(&mut data.available_commands, previous);

    let Some(target) = data.first_enemy() else {
        return libraries.random.pick(&data.available_commands).copied();
    };
    let (dist_x, dist_y, best_x, best_y) = preferred_axes(data.position, target);

    // Equally good either way: keep going the same way instead of zigzagging.
    if dist_x.abs() == dist_y.abs() {
        if let Some(previous) = previous {
            if (previous == best_x || previous == best_y) && data.is_available(previous) {
                return Some(previous);
            }
        }
    }

    if (dist_x.abs() > dist_y.abs() || !data.is_available(best_y)) && data.is_available(best_x) {
        return Some(best_x);
    }
    if data.is_available(best_y) {
        return Some(best_y);
    }

    libraries.random.pick(&data.available_commands).copied()
}
