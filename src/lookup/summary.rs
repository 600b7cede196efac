use super::table::Table;
use serde::Serialize;

/// Shape of a loaded table, for inspection and logs.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub deck: usize,
    pub classes: u32,
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Phase {
    pub cards: usize,
    pub entries: usize,
    pub capacity: usize,
    pub shards: usize,
    /// slots per entry
    pub load: f64,
    pub longest_probe: usize,
}

impl From<&Table> for Summary {
    fn from(table: &Table) -> Self {
        Self {
            deck: table.deck(),
            classes: table.classes(),
            phases: table
                .phases()
                .map(|(cards, map)| Phase {
                    cards,
                    entries: map.len(),
                    capacity: map.capacity(),
                    shards: map.shards(),
                    load: map.capacity() as f64 / map.len().max(1) as f64,
                    longest_probe: map.longest_probe(),
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "{:<32}{:<32}", "deck", self.deck)?;
        writeln!(f, "{:<32}{:<32}", "classes", self.classes)?;
        for phase in self.phases.iter() {
            writeln!(
                f,
                "{:<32}{:>12} entries {:>12} slots {:>6.2} load {:>4} probe",
                format!("{}-card phase", phase.cards),
                phase.entries,
                phase.capacity,
                phase.load,
                phase.longest_probe,
            )?;
        }
        Ok(())
    }
}
