//! Rolling and aggregation.
//!
//! Every aggregation rule starts from the same parsed [`Expression`]; what
//! differs is how pool signs and the flat modifier are applied.

use rand::Rng;

use super::notation::{Expression, Pool};

/// Roll a single die, uniform in `[1, sides]`.
pub fn roll_die(sides: u32) -> u32 {
    rand::rng().random_range(1..=sides)
}

/// The raw rolls for one pool of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolRolls {
    pub pool: Pool,
    pub rolls: Vec<u32>,
}

impl PoolRolls {
    fn roll(pool: Pool) -> Self {
        let rolls = (0..pool.count).map(|_| roll_die(pool.sides)).collect();
        Self { pool, rolls }
    }

    fn sum(&self) -> i64 {
        self.rolls.iter().map(|&r| i64::from(r)).sum()
    }
}

/// Outcome of the per-die rule: the modifier applies to every die of every
/// pool. Pool signs do not participate in this rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub pools: Vec<PoolRolls>,
    pub modifier: i64,
}

impl RollOutcome {
    /// Sum of every modified die.
    pub fn total(&self) -> i64 {
        self.pools
            .iter()
            .map(|p| p.sum() + self.modifier * p.rolls.len() as i64)
            .sum()
    }

    /// Render as Discord markdown, one line per pool. On a d20, a natural
    /// 20 is bolded and a natural 1 renders as `**Nat1**` with no modifier
    /// arithmetic shown.
    pub fn format(&self) -> String {
        let mut parts = Vec::new();

        if self.modifier == 0 {
            for pool in &self.pools {
                let rolls: Vec<String> = pool
                    .rolls
                    .iter()
                    .map(|&r| match (pool.pool.sides, r) {
                        (20, 20) => "**20**".to_string(),
                        (20, 1) => "**Nat1**".to_string(),
                        _ => r.to_string(),
                    })
                    .collect();
                parts.push(format!(
                    "{} Result - ({})",
                    pool.pool.to_string().to_uppercase(),
                    rolls.join(", ")
                ));
            }
        } else {
            for pool in &self.pools {
                let mut base_parts = Vec::new();
                let mut calc_parts = Vec::new();
                let mut result_parts = Vec::new();

                for &roll in &pool.rolls {
                    let modified = i64::from(roll) + self.modifier;
                    match (pool.pool.sides, roll) {
                        (20, 20) => {
                            base_parts.push("**20**".to_string());
                            calc_parts.push(format!("(**20**{:+})", self.modifier));
                            result_parts.push(format!("**{modified}**"));
                        }
                        (20, 1) => {
                            base_parts.push("**Nat1**".to_string());
                            calc_parts.push("(**Nat1**)".to_string());
                            result_parts.push("**Nat1**".to_string());
                        }
                        _ => {
                            base_parts.push(roll.to_string());
                            calc_parts.push(format!("({roll}{:+})", self.modifier));
                            result_parts.push(modified.to_string());
                        }
                    }
                }

                parts.push(format!(
                    "{} Result - ({}) = {} = ({})",
                    pool.pool.to_string().to_uppercase(),
                    base_parts.join(", "),
                    calc_parts.join(" "),
                    result_parts.join(", ")
                ));
            }
        }

        parts.join("\n")
    }
}

/// Roll with the modifier applied to each die across all pools.
/// Example: `3d8+2d6+5` gives every die in both pools a +5.
pub fn roll(expr: &Expression) -> RollOutcome {
    RollOutcome {
        pools: expr.pools.iter().map(|&(_, pool)| PoolRolls::roll(pool)).collect(),
        modifier: expr.modifier,
    }
}

/// Outcome of the summed-damage rule: pools summed separately (with their
/// signs), then the flat modifier added once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageOutcome {
    pub components: Vec<PoolRolls>,
    pub modifier: i64,
    pub total: i64,
}

impl DamageOutcome {
    /// Render as Discord markdown: `(3, 5) + (2) + [+5] = 15`.
    pub fn format(&self) -> String {
        let mut parts: Vec<String> = self
            .components
            .iter()
            .map(|c| {
                let rolls: Vec<String> = c.rolls.iter().map(u32::to_string).collect();
                format!("({})", rolls.join(", "))
            })
            .collect();

        if self.modifier != 0 {
            parts.push(format!("[{:+}]", self.modifier));
        }

        format!("{} = {}", parts.join(" + "), self.total)
    }
}

/// Roll damage: sum each pool, apply pool signs, then add the modifier.
/// Example: `3d4+4d6+4` is `sum(3d4) + sum(4d6) + 4`.
pub fn damage(expr: &Expression) -> DamageOutcome {
    let mut components = Vec::new();
    let mut total = expr.modifier;

    for &(sign, pool) in &expr.pools {
        let rolled = PoolRolls::roll(pool);
        total += sign * rolled.sum();
        components.push(rolled);
    }

    DamageOutcome {
        components,
        modifier: expr.modifier,
        total,
    }
}

/// Two rolls of the same expression, with the kept total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contest {
    pub first: RollOutcome,
    pub second: RollOutcome,
    pub total: i64,
}

/// Roll twice, keep the higher total. Ties keep the first roll.
pub fn advantage(expr: &Expression) -> Contest {
    let first = roll(expr);
    let second = roll(expr);
    let total = first.total().max(second.total());
    Contest { first, second, total }
}

/// Roll twice, keep the lower total. Ties keep the first roll.
pub fn disadvantage(expr: &Expression) -> Contest {
    let first = roll(expr);
    let second = roll(expr);
    let total = first.total().min(second.total());
    Contest { first, second, total }
}

/// One ability score: 4d6, drop the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbilityScore {
    pub rolls: [u32; 4],
    pub total: u32,
}

impl AbilityScore {
    fn roll() -> Self {
        let rolls = [roll_die(6), roll_die(6), roll_die(6), roll_die(6)];
        let total = rolls.iter().sum::<u32>() - rolls.iter().copied().min().unwrap_or(0);
        Self { rolls, total }
    }

    /// Index of the dropped (first minimal) die.
    pub fn lowest_index(&self) -> usize {
        self.rolls
            .iter()
            .enumerate()
            .min_by_key(|&(_, r)| r)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// A full stat block: six 4d6-drop-lowest scores.
pub fn ability_scores() -> [AbilityScore; 6] {
    std::array::from_fn(|_| AbilityScore::roll())
}
