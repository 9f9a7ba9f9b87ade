/// Per-room belief record.
///
/// Every field is a four-state `Belief`. Values only ever climb the
/// lattice `Unknown → Maybe → {True | False}`; a write that would move a
/// field back down is ignored, and a write that would flip `True ↔ False`
/// is a contradiction and panics. The single sanctioned retraction is
/// `clear_kill`, applied when a scream confirms a wumpus died.
///
/// Properties are derived through methods, not stored as flags:
///   - `is_safe`:  no wumpus and no pit
///   - `is_empty`: no stench and no breeze

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Belief {
    True,
    False,
    Maybe,
    #[default]
    Unknown,
}

impl Belief {
    pub fn from_bool(b: bool) -> Self {
        if b { Belief::True } else { Belief::False }
    }

    /// TRUE or FALSE.
    pub fn is_known(self) -> bool {
        matches!(self, Belief::True | Belief::False)
    }

    /// Monotone merge of an assertion into the current value.
    /// `None` means the assertion contradicts what is already known.
    pub fn join(self, next: Belief) -> Option<Belief> {
        match (self, next) {
            (Belief::True, Belief::False) | (Belief::False, Belief::True) => None,
            (Belief::True | Belief::False, _) => Some(self),
            (Belief::Maybe, Belief::Unknown) => Some(self),
            (_, next) => Some(next),
        }
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Belief::True => "T",
            Belief::False => "F",
            Belief::Maybe => "M",
            Belief::Unknown => "U",
        };
        f.write_str(s)
    }
}

/// Addressable fields of a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Attribute {
    Wumpus,
    Pit,
    Stench,
    Breeze,
    Gold,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BeliefCell {
    wumpus: Belief,
    pit: Belief,
    stench: Belief,
    breeze: Belief,
    gold: Belief,
}

/// Merge `next` into `slot`. Returns true if the stored value changed.
fn write(slot: &mut Belief, next: Belief, what: Attribute) -> bool {
    let merged = match slot.join(next) {
        Some(v) => v,
        None => panic!("contradictory {what:?} belief: {} then {}", slot, next),
    };
    let changed = merged != *slot;
    *slot = merged;
    changed
}

impl BeliefCell {
    pub fn get(&self, attr: Attribute) -> Belief {
        match attr {
            Attribute::Wumpus => self.wumpus,
            Attribute::Pit => self.pit,
            Attribute::Stench => self.stench,
            Attribute::Breeze => self.breeze,
            Attribute::Gold => self.gold,
        }
    }

    /// Assert `value` for `attr`, applying the one-hazard-per-room rule.
    /// Returns true if any field of this cell changed.
    pub fn set(&mut self, attr: Attribute, value: Belief) -> bool {
        match attr {
            Attribute::Wumpus => self.set_wumpus(value),
            Attribute::Pit => self.set_pit(value),
            Attribute::Stench => write(&mut self.stench, value, attr),
            Attribute::Breeze => write(&mut self.breeze, value, attr),
            Attribute::Gold => write(&mut self.gold, value, attr),
        }
    }

    pub fn wumpus(&self) -> Belief { self.wumpus }
    pub fn pit(&self) -> Belief { self.pit }
    pub fn stench(&self) -> Belief { self.stench }
    pub fn breeze(&self) -> Belief { self.breeze }
    pub fn gold(&self) -> Belief { self.gold }

    /// A confirmed wumpus room holds neither a pit nor gold.
    pub fn set_wumpus(&mut self, value: Belief) -> bool {
        let mut changed = write(&mut self.wumpus, value, Attribute::Wumpus);
        if value == Belief::True {
            changed |= write(&mut self.pit, Belief::False, Attribute::Pit);
            changed |= write(&mut self.gold, Belief::False, Attribute::Gold);
        }
        changed
    }

    /// A confirmed pit room holds neither a wumpus nor gold.
    pub fn set_pit(&mut self, value: Belief) -> bool {
        let mut changed = write(&mut self.pit, value, Attribute::Pit);
        if value == Belief::True {
            changed |= write(&mut self.wumpus, Belief::False, Attribute::Wumpus);
            changed |= write(&mut self.gold, Belief::False, Attribute::Gold);
        }
        changed
    }

    pub fn is_safe(&self) -> bool {
        self.wumpus == Belief::False && self.pit == Belief::False
    }

    pub fn mark_safe(&mut self) -> bool {
        let w = self.set_wumpus(Belief::False);
        let p = self.set_pit(Belief::False);
        w || p
    }

    pub fn is_empty(&self) -> bool {
        self.stench == Belief::False && self.breeze == Belief::False
    }

    /// Both sensory fields recorded, i.e. the agent has stood here.
    pub fn is_observed(&self) -> bool {
        self.stench.is_known() && self.breeze.is_known()
    }

    /// Rooms beyond a discovered edge are safe and empty so they never
    /// block reasoning or route search.
    pub fn mark_out_of_bounds(&mut self) -> bool {
        let mut changed = self.mark_safe();
        changed |= write(&mut self.stench, Belief::False, Attribute::Stench);
        changed |= write(&mut self.breeze, Belief::False, Attribute::Breeze);
        changed |= write(&mut self.gold, Belief::False, Attribute::Gold);
        changed
    }

    /// A scream proved the wumpus here is dead. Overrides a confirmed
    /// wumpus; the room is safe afterwards.
    pub fn clear_kill(&mut self) -> bool {
        let mut changed = self.wumpus != Belief::False;
        self.wumpus = Belief::False;
        changed |= write(&mut self.pit, Belief::False, Attribute::Pit);
        changed
    }

    /// One glyph for the debug map.
    pub fn glyph(&self) -> char {
        match (self.wumpus, self.pit) {
            (Belief::True, _) => 'W',
            (_, Belief::True) => 'P',
            _ if self.gold == Belief::True => 'G',
            _ if self.is_safe() => '.',
            (Belief::Maybe, _) => 'w',
            (_, Belief::Maybe) => 'p',
            _ => '?',
        }
    }
}

impl fmt::Display for BeliefCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(G: {}, W: {}, P: {}, S: {}, B: {})",
            self.gold, self.wumpus, self.pit, self.stench, self.breeze
        )
    }
}
