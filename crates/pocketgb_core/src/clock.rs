/// Number of clock ticks (T-cycles) in one machine cycle.
pub const T_CYCLES_PER_M_CYCLE: u32 = 4;

/// Cycle accounting for the CPU.
///
/// Both counters are kept in T-cycles. Every instruction costs a whole
/// number of machine cycles, so both values are always multiples of 4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    last: u32,
    total: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an instruction that took `cycles` T-cycles.
    #[inline]
    pub fn tick(&mut self, cycles: u32) {
        debug_assert_eq!(
            cycles % T_CYCLES_PER_M_CYCLE,
            0,
            "cycle cost {cycles} is not a whole number of machine cycles"
        );
        self.last = cycles;
        self.total = self.total.wrapping_add(cycles as u64);
    }

    /// T-cycles taken by the most recently executed instruction.
    #[inline]
    pub fn last_cycles(&self) -> u32 {
        self.last
    }

    #[inline]
    pub fn last_m_cycles(&self) -> u32 {
        self.last / T_CYCLES_PER_M_CYCLE
    }

    /// T-cycles elapsed since reset.
    #[inline]
    pub fn total_cycles(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn total_m_cycles(&self) -> u64 {
        self.total / T_CYCLES_PER_M_CYCLE as u64
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
