use serde::{Deserialize, Serialize};

pub const MAX_HP: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: i32,
    pub max_hp: i32,
}

impl Vitals {
    pub fn new(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }

    /// Hit points as compared when deciding a winner; never below zero.
    pub fn standing(&self) -> i32 {
        self.hp.max(0)
    }

    pub fn restore(&mut self) {
        self.hp = self.max_hp;
    }

    /// Subtract `dmg` without clamping. Returns true if this blow took the
    /// combatant from positive hp to zero or below.
    pub fn take(&mut self, dmg: i32) -> bool {
        let before = self.hp;
        self.hp -= dmg;
        debug_assert!(self.hp <= self.max_hp, "hp above max after taking {dmg}");
        before > 0 && self.hp <= 0
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(MAX_HP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_reports_only_the_dropping_blow() {
        let mut v = Vitals::new(10);
        assert!(!v.take(4));
        assert!(v.take(6));
        assert!(!v.take(3));
        assert_eq!(v.hp, -3);
        assert_eq!(v.standing(), 0);
    }

    #[test]
    fn restore_returns_to_max() {
        let mut v = Vitals::default();
        v.take(250);
        v.restore();
        assert_eq!(v.hp, MAX_HP);
        assert!(!v.is_down());
    }
}
