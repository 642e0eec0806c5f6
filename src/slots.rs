/// The fixed weekend time-slot grids. Slot order is the first-fit scan
/// order, so the sequences below are part of the scheduling contract.
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    senior_slots: Vec<String>,
    junior_slots: Vec<String>,
    senior_prefix: String,
}

impl SlotCatalog {
    pub fn new(
        senior_prefix: impl Into<String>,
        senior_slots: Vec<String>,
        junior_slots: Vec<String>,
    ) -> Self {
        Self {
            senior_slots,
            junior_slots,
            senior_prefix: senior_prefix.into(),
        }
    }

    /// Selects the slot sequence for a grade: grades named with the senior
    /// prefix get the longer, coarser slots, everyone else the junior grid.
    pub fn slots_for_grade(&self, grade: &str) -> &[String] {
        if grade.starts_with(&self.senior_prefix) {
            &self.senior_slots
        } else {
            &self.junior_slots
        }
    }

    pub fn senior_slots(&self) -> &[String] {
        &self.senior_slots
    }

    pub fn junior_slots(&self) -> &[String] {
        &self.junior_slots
    }
}

impl Default for SlotCatalog {
    /// The weekend grid: junior sessions run 1.5h, senior sessions 2h.
    fn default() -> Self {
        let junior = [
            "Sat 8:00-9:30",
            "Sat 9:30-11:00",
            "Sat 11:00-12:30",
            "Sat 13:00-14:30",
            "Sat 14:30-16:00",
            "Sat 16:00-17:30",
            "Sat 17:30-19:00",
            "Sun 8:00-9:30",
            "Sun 9:30-11:00",
            "Sun 11:00-12:30",
            "Sun 13:00-14:30",
            "Sun 14:30-16:00",
            "Sun 16:00-17:30",
            "Sun 17:30-19:00",
        ];
        let senior = [
            "Sat 8:00-10:00",
            "Sat 10:00-12:00",
            "Sat 13:00-15:00",
            "Sat 15:00-17:00",
            "Sat 17:00-19:00",
            "Sun 8:00-10:00",
            "Sun 10:00-12:00",
            "Sun 13:00-15:00",
            "Sun 15:00-17:00",
            "Sun 17:00-19:00",
        ];
        Self::new(
            "Senior",
            senior.iter().map(|s| s.to_string()).collect(),
            junior.iter().map(|s| s.to_string()).collect(),
        )
    }
}

/// True iff the slot label equals or occurs inside one of the availability
/// labels. Substring containment lets a coarse declaration cover every slot
/// label lexically nested in it; labels are compared verbatim, with no case
/// or whitespace normalization.
pub fn is_available(slot: &str, availability: &[String]) -> bool {
    availability.iter().any(|window| window.contains(slot))
}
