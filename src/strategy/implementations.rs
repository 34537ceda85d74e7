// src/strategy/implementations.rs

use crate::model::demand::BillOfMaterials;
use crate::model::types::{Price, ProductId, SupplierAddress};
use crate::strategy::traits::{PriceModel, ProductionLine, SupplierSelector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// =========================================================================
// 1. Random Supplier Selector
// =========================================================================

/// Uniform choice among the suppliers of a component.
#[derive(Debug, Clone)]
pub struct RandomSupplierSelector {
    rng: StdRng,
}

impl RandomSupplierSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SupplierSelector for RandomSupplierSelector {
    fn select(&mut self, _component: ProductId, suppliers: &[SupplierAddress]) -> Option<usize> {
        if suppliers.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..suppliers.len()))
    }
}

// =========================================================================
// 2. Cheapest Supplier Selector
// =========================================================================

/// Sends the RFQ to the supplier with the lowest average price paid so far.
/// Suppliers never bought from are tried first, in random order.
#[derive(Debug, Clone)]
pub struct CheapestSupplierSelector {
    rng: StdRng,
    paid: HashMap<(ProductId, SupplierAddress), RunningMean>,
}

impl CheapestSupplierSelector {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            paid: HashMap::new(),
        }
    }

    fn average(&self, component: ProductId, supplier: &str) -> Option<f64> {
        self.paid
            .get(&(component, supplier.to_string()))
            .map(RunningMean::mean)
    }
}

impl SupplierSelector for CheapestSupplierSelector {
    fn select(&mut self, component: ProductId, suppliers: &[SupplierAddress]) -> Option<usize> {
        if suppliers.is_empty() {
            return None;
        }

        let untried: Vec<usize> = (0..suppliers.len())
            .filter(|&i| self.average(component, &suppliers[i]).is_none())
            .collect();
        if !untried.is_empty() {
            return Some(untried[self.rng.gen_range(0..untried.len())]);
        }

        (0..suppliers.len())
            .filter_map(|i| self.average(component, &suppliers[i]).map(|avg| (i, avg)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn record_purchase(&mut self, component: ProductId, supplier: &str, unit_price: Price) {
        self.paid
            .entry((component, supplier.to_string()))
            .or_default()
            .push(unit_price);
    }
}

// =========================================================================
// 3. Zero Reserve Price
// =========================================================================

/// Accepts any price.
#[derive(Debug, Clone, Default)]
pub struct ZeroReservePrice;

impl PriceModel for ZeroReservePrice {
    fn reserve_price(&mut self, _component: ProductId, _quantity: u32) -> Price {
        0
    }
}

// =========================================================================
// 4. Historical Reserve Price
// =========================================================================

/// Caps supplier prices at the average price paid so far times `markup`.
/// Components never bought stay uncapped.
#[derive(Debug, Clone)]
pub struct HistoricalReservePrice {
    markup: f64,
    paid: HashMap<ProductId, RunningMean>,
}

impl HistoricalReservePrice {
    pub fn new(markup: f64) -> Self {
        Self {
            markup,
            paid: HashMap::new(),
        }
    }
}

impl PriceModel for HistoricalReservePrice {
    fn reserve_price(&mut self, component: ProductId, _quantity: u32) -> Price {
        match self.paid.get(&component) {
            Some(mean) => (mean.mean() * self.markup).round() as Price,
            None => 0,
        }
    }

    fn record_purchase(&mut self, component: ProductId, unit_price: Price) {
        self.paid.entry(component).or_default().push(unit_price);
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningMean {
    sum: u64,
    count: u32,
}

impl RunningMean {
    fn push(&mut self, price: Price) {
        self.sum += u64::from(price);
        self.count += 1;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum as f64 / f64::from(self.count)
    }
}

// =========================================================================
// 5. Factory
// =========================================================================

/// Assembly line with a daily cycle budget and a component store.
#[derive(Debug, Clone)]
pub struct Factory {
    bom: BillOfMaterials,
    cycles_per_unit: HashMap<ProductId, u32>,
    default_cycles: u32,
    components: BTreeMap<ProductId, u32>,
    free_cycles: u32,
}

impl Factory {
    pub fn new(bom: BillOfMaterials, daily_capacity: u32) -> Self {
        Self {
            bom,
            cycles_per_unit: HashMap::new(),
            default_cycles: 1,
            components: BTreeMap::new(),
            free_cycles: daily_capacity,
        }
    }

    pub fn with_cycles(mut self, product: ProductId, cycles: u32) -> Self {
        self.cycles_per_unit.insert(product, cycles);
        self
    }

    pub fn component_stock(&self, component: ProductId) -> u32 {
        self.components.get(&component).copied().unwrap_or(0)
    }

    fn cycles_for(&self, product: ProductId, quantity: u32) -> u64 {
        let per_unit = self
            .cycles_per_unit
            .get(&product)
            .copied()
            .unwrap_or(self.default_cycles);
        u64::from(per_unit) * u64::from(quantity)
    }
}

impl ProductionLine for Factory {
    fn request_production(&mut self, product: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return true;
        }

        let cycles = self.cycles_for(product, quantity);
        if cycles > u64::from(self.free_cycles) {
            debug!(product, quantity, cycles, free = self.free_cycles, "not enough factory capacity");
            return false;
        }

        let lines = self.bom.components(product);
        let missing = lines.iter().find(|line| {
            u64::from(self.component_stock(line.component))
                < u64::from(line.per_unit) * u64::from(quantity)
        });
        if let Some(line) = missing {
            debug!(product, quantity, component = line.component, "missing components");
            return false;
        }

        for line in lines {
            if let Some(stock) = self.components.get_mut(&line.component) {
                *stock -= line.per_unit * quantity;
            }
        }
        // cycles <= free_cycles, so it fits in u32
        self.free_cycles -= cycles as u32;
        true
    }

    fn receive_components(&mut self, component: ProductId, quantity: u32) {
        *self.components.entry(component).or_insert(0) += quantity;
    }

    fn set_capacity(&mut self, cycles: u32) {
        self.free_cycles = cycles;
    }

    fn free_capacity(&self) -> u32 {
        self.free_cycles
    }
}
