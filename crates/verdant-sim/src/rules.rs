//! Fixed simulation rules: tiered tables and multipliers.
//!
//! Every table is evaluated from the most extreme band to the least extreme,
//! first match wins. For the cold bands that means `< 10` is checked before
//! `< 15`.

/// Water level below which automatic watering is armed.
pub const AUTO_WATER_THRESHOLD: u32 = 50;

/// Water level automatic watering aims for.
pub const AUTO_WATER_TARGET: u32 = 75;

/// Maximum water added by one automatic watering.
pub const AUTO_WATER_MAX: u32 = 25;

/// Water level below which plants take drought damage.
pub const DROUGHT_THRESHOLD: u32 = 30;

/// Water level above which watering damages plants.
pub const OVERWATER_THRESHOLD: u32 = 80;

/// Insect damage strictly above this is always severe.
pub const SEVERE_DAMAGE: u32 = 15;

/// Post-attack health strictly below this makes an attack severe.
pub const SEVERE_HEALTH: u32 = 30;

fn is_extreme(temperature: i32) -> bool {
    temperature > 35 || temperature < 10
}

/// Water-decay multiplier for the ambient temperature.
#[must_use]
pub fn decay_multiplier(temperature: i32) -> f64 {
    match temperature {
        t if t > 35 => 2.5,
        t if t > 30 => 2.0,
        t if t > 25 => 1.5,
        t if t < 10 => 1.5,
        t if t < 15 => 1.2,
        _ => 1.0,
    }
}

/// Water lost in one decay cycle.
#[must_use]
pub fn water_decay(water_requirement: u32, temperature: i32) -> u32 {
    (f64::from(water_requirement) * decay_multiplier(temperature)) as u32
}

/// Health lost in one decay cycle while water is below [`DROUGHT_THRESHOLD`].
#[must_use]
pub fn drought_damage(water_level: u32, temperature: i32) -> u32 {
    let base = match water_level {
        l if l < 20 => 4,
        l if l < 25 => 3,
        _ => 2,
    };
    if is_extreme(temperature) {
        base + 2
    } else {
        base
    }
}

/// Temperature factor applied to automatic watering.
#[must_use]
pub fn watering_temperature_multiplier(temperature: i32) -> f64 {
    match temperature {
        t if t > 35 => 1.5,
        t if t > 30 => 1.3,
        t if t > 25 => 1.1,
        t if t < 10 => 0.7,
        t if t < 15 => 0.9,
        _ => 1.0,
    }
}

/// Health factor applied to automatic watering; weak plants get more.
#[must_use]
pub fn watering_health_multiplier(health: u32) -> f64 {
    match health {
        h if h < 30 => 1.5,
        h if h < 50 => 1.3,
        _ => 1.0,
    }
}

/// Water added by one automatic watering, 0 when none is needed.
#[must_use]
pub fn auto_water_amount(water_level: u32, health: u32, temperature: i32) -> u32 {
    if water_level >= AUTO_WATER_THRESHOLD {
        return 0;
    }
    let needed = f64::from(AUTO_WATER_TARGET - water_level);
    let scaled = needed
        * watering_temperature_multiplier(temperature)
        * watering_health_multiplier(health);
    (scaled as u32).min(AUTO_WATER_MAX)
}

/// Health regained in one recovery cycle. Never less than 1.
#[must_use]
pub fn recovery_amount(health: u32, water_level: u32, temperature: i32) -> u32 {
    let mut amount: u32 = match health {
        h if h < 30 => 7,
        h if h < 50 => 5,
        _ => 3,
    };

    if water_level >= 60 {
        amount += 2;
    } else if water_level < 40 {
        amount = amount.saturating_sub(1).max(1);
    }

    if (20..=30).contains(&temperature) {
        amount += 1;
    } else if is_extreme(temperature) {
        amount = amount.saturating_sub(1).max(1);
    }
    amount
}

/// Health lost after watering raised the level to `water_level`.
#[must_use]
pub fn overwater_damage(water_level: u32) -> u32 {
    water_level.saturating_sub(OVERWATER_THRESHOLD) / 2
}

/// Whether an insect hit is reported on the important channel.
#[must_use]
pub fn is_severe_damage(damage: u32, health_after: u32) -> bool {
    damage > SEVERE_DAMAGE || health_after < SEVERE_HEALTH
}
