use slotmap::new_key_type;

new_key_type! {
    /// Identifies a registered processing unit inside a [`Driver`].
    ///
    /// [`Driver`]: crate::driver::Driver
    pub struct UnitId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn unit_ids_are_distinct() {
        let mut sm = SlotMap::<UnitId, &str>::with_key();
        let a = sm.insert("a");
        let b = sm.insert("b");
        assert_ne!(a, b);
        assert_eq!(sm[a], "a");
    }

    #[test]
    fn unit_ids_are_hashable() {
        use std::collections::HashMap;
        let mut sm = SlotMap::<UnitId, ()>::with_key();
        let id = sm.insert(());
        let mut map = HashMap::new();
        map.insert(id, "neuron-0");
        assert_eq!(map[&id], "neuron-0");
    }
}
