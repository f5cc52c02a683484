use std::collections::HashMap;

use crate::holding::Holding;

/// An aggregated holding of one metal/design combination. Positions are a
/// pure projection of the current wallet contents and are recomputed on
/// every pass; they are never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub metal: String,
    pub design: String,
    pub ounces: f64,
    pub total_cost: f64,
    pub avg_buy_price: f64,
}

/// Group raw holdings into positions keyed by (metal, design), summing
/// ounces and cost, then derive the weighted-average buy price per group.
///
/// Output order is the order each key was first seen. A group only exists
/// once at least one holding contributed to it, so `ounces` is always
/// positive when the average is taken.
pub fn aggregate(holdings: &[Holding]) -> Vec<Position> {
    let mut positions: Vec<Position> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for holding in holdings {
        let key = (holding.metal.clone(), holding.design.clone());
        match index.get(&key) {
            Some(&i) => {
                positions[i].ounces += holding.ounces();
                positions[i].total_cost += holding.cost();
            }
            None => {
                index.insert(key, positions.len());
                positions.push(Position {
                    metal: holding.metal.clone(),
                    design: holding.design.clone(),
                    ounces: holding.ounces(),
                    total_cost: holding.cost(),
                    avg_buy_price: 0.0,
                });
            }
        }
    }

    for position in &mut positions {
        position.avg_buy_price = position.total_cost / position.ounces;
    }

    positions
}
