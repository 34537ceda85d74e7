// src/model/demand.rs

use crate::model::types::{ProductId, SupplierAddress};
use std::collections::{BTreeMap, HashMap};

/// One line of a bill of materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BomLine {
    pub component: ProductId,
    /// Units of the component per unit of product.
    pub per_unit: u32,
}

/// Product -> components needed to assemble one unit.
#[derive(Debug, Clone, Default)]
pub struct BillOfMaterials {
    lines: HashMap<ProductId, Vec<BomLine>>,
}

impl BillOfMaterials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product whose components are each needed once per unit.
    pub fn with_product(mut self, product: ProductId, components: &[ProductId]) -> Self {
        let lines = components
            .iter()
            .map(|&component| BomLine {
                component,
                per_unit: 1,
            })
            .collect();
        self.lines.insert(product, lines);
        self
    }

    pub fn with_lines(mut self, product: ProductId, lines: Vec<BomLine>) -> Self {
        self.lines.insert(product, lines);
        self
    }

    pub fn components(&self, product: ProductId) -> &[BomLine] {
        self.lines.get(&product).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn products(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.lines.keys().copied()
    }
}

/// Component -> suppliers that sell it.
#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    suppliers: HashMap<ProductId, Vec<SupplierAddress>>,
}

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supplier(mut self, component: ProductId, supplier: &str) -> Self {
        self.suppliers
            .entry(component)
            .or_default()
            .push(supplier.to_string());
        self
    }

    pub fn suppliers_for(&self, component: ProductId) -> &[SupplierAddress] {
        self.suppliers
            .get(&component)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Outstanding component demand from accepted customer orders.
///
/// Values can dip below zero between an optimistic RFQ and the next order
/// acceptance; that is bookkeeping, not an error.
#[derive(Debug, Default)]
pub struct DemandLedger {
    outstanding: BTreeMap<ProductId, i64>,
}

impl DemandLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_order_accepted(&mut self, bom: &BillOfMaterials, product: ProductId, quantity: u32) {
        for line in bom.components(product) {
            self.adjust(line.component, i64::from(quantity) * i64::from(line.per_unit));
        }
    }

    pub fn record_order_canceled(&mut self, bom: &BillOfMaterials, product: ProductId, quantity: u32) {
        for line in bom.components(product) {
            self.adjust(line.component, -(i64::from(quantity) * i64::from(line.per_unit)));
        }
    }

    /// Optimistic booking: assume the supplier will deliver.
    pub fn record_procurement_issued(&mut self, component: ProductId, quantity: u32) {
        self.adjust(component, -i64::from(quantity));
    }

    /// Puts back demand an RFQ failed to cover.
    pub fn record_procurement_failed(&mut self, component: ProductId, quantity: u32) {
        self.adjust(component, i64::from(quantity));
    }

    pub fn outstanding(&self, component: ProductId) -> i64 {
        self.outstanding.get(&component).copied().unwrap_or(0)
    }

    /// Components with strictly positive demand, in id order.
    pub fn positive(&self) -> Vec<(ProductId, u32)> {
        self.outstanding
            .iter()
            .filter(|(_, q)| **q > 0)
            .map(|(c, q)| (*c, u32::try_from(*q).unwrap_or(u32::MAX)))
            .collect()
    }

    fn adjust(&mut self, component: ProductId, delta: i64) {
        *self.outstanding.entry(component).or_insert(0) += delta;
    }
}
