//! Shield ability: a short full-immunity window on the player.

use crate::config::ShieldAbilityTuning;
use crate::gameplay::health::Health;

pub(super) fn activate(tuning: &ShieldAbilityTuning, health: &mut Health) -> bool {
    health.activate_shield(tuning.duration, tuning.absorb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_or_shieldless_player_cannot_shield() {
        let tuning = ShieldAbilityTuning::default();

        let mut shieldless = Health::new(100).without_shield();
        assert!(!activate(&tuning, &mut shieldless));

        let mut dead = Health::new(10);
        dead.take_damage(10);
        assert!(!activate(&tuning, &mut dead));

        let mut healthy = Health::new(100);
        assert!(activate(&tuning, &mut healthy));
        assert!(healthy.shield_active());
    }
}
