//! Combat resolution: damage, counter-attack, and removal of the dead

use serde::{Deserialize, Serialize};

use crate::battle::battle_map::BattleMap;
use crate::battle::constants::DAMAGE_MULTIPLIER;
use crate::battle::cost_field::CostField;
use crate::core::config::RetaliationRule;
use crate::core::types::UnitId;

/// What happened in one exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub damage: i32,
    /// Counter-attack damage, if the attacker stood in the defender's band
    pub retaliation: Option<i32>,
    /// Units removed after the exchange (either or both)
    pub killed: Vec<UnitId>,
}

/// Integer damage: `DAMAGE_MULTIPLIER * attack / defense`, rounded down
///
/// The product saturates, so huge attack values cap at `i32::MAX / defense`.
pub fn calculate_damage(attack: i32, defense: i32) -> i32 {
    DAMAGE_MULTIPLIER.saturating_mul(attack) / defense.max(1)
}

/// Resolve an attack between two live units
///
/// The cost field is left anchored on the defender, since that is what
/// decides whether the counter-attack reaches. The defender strikes back
/// even if the first blow killed it. Returns `None` if either handle is stale.
pub fn resolve_attack(
    map: &mut BattleMap,
    field: &mut CostField,
    attacker_id: UnitId,
    defender_id: UnitId,
    rule: RetaliationRule,
    pass_limit: u32,
) -> Option<AttackReport> {
    let attacker = map.unit(attacker_id)?;
    let defender = map.unit(defender_id)?;
    let attacker_kind = map.unit_kind(attacker).clone();
    let defender_kind = map.unit_kind(defender).clone();
    let (attacker_coord, defender_coord) = (attacker.coord, defender.coord);

    let damage = calculate_damage(attacker_kind.attack_damage, defender_kind.defense);
    let defender = map.unit_mut(defender_id)?;
    defender.health = defender.health.saturating_sub(damage);

    field.populate(map, defender_coord, pass_limit);
    let distance = field.cost_at(attacker_coord);
    let retaliation = defender_kind.in_attack_range(distance).then(|| {
        let defense = match rule {
            RetaliationRule::DefenderDefense => defender_kind.defense,
            RetaliationRule::AttackerDefense => attacker_kind.defense,
        };
        calculate_damage(defender_kind.attack_damage, defense)
    });
    if let Some(counter) = retaliation {
        let attacker = map.unit_mut(attacker_id)?;
        attacker.health = attacker.health.saturating_sub(counter);
    }

    let killed = map.remove_dead();
    for id in &killed {
        tracing::info!("Unit {:?} destroyed", id);
    }

    tracing::debug!(
        "{} ({:?}) hit {} ({:?}) for {}, counter {:?}",
        attacker_kind.name,
        attacker_id,
        defender_kind.name,
        defender_id,
        damage,
        retaliation
    );

    Some(AttackReport {
        attacker: attacker_id,
        defender: defender_id,
        damage,
        retaliation,
        killed,
    })
}
